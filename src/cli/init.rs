use std::path::Path;

use anyhow::Context;
use clap::Parser;
use fconsole::{Config, FileGateway, domain::Environment, gateway::CONFIG_FILE};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Init {
    /// Deployment environment (dev or prod)
    #[arg(long, default_value_t)]
    env: Environment,

    /// Author id new posts are attributed to
    #[arg(long)]
    admin_id: Option<String>,

    /// Account id on the hosted image service
    #[arg(long)]
    cloudinary_id: Option<String>,

    /// Clear a leftover cover image when opening a post that has none
    #[arg(long)]
    clear_cover_on_absence: bool,
}

impl Init {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = Config {
            env: self.env,
            admin_id: self.admin_id,
            cloudinary_id: self.cloudinary_id,
            clear_cover_on_absence: self.clear_cover_on_absence,
        };

        let created = FileGateway::init(root, &config)
            .with_context(|| format!("failed to initialize post store at {}", root.display()))?;

        if created {
            println!(
                "{}",
                format!("Initialized post store in {}", root.display()).success()
            );
            println!("  Created: {CONFIG_FILE}");
        } else {
            println!(
                "{}",
                format!("Found existing {CONFIG_FILE}; configuration left unchanged").warning()
            );
        }
        Ok(())
    }
}
