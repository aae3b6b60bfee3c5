use std::path::PathBuf;

use clap::Parser;
use fconsole::{PostGateway, PostId};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Move a post to the trash, or restore it")]
pub struct Delete {
    /// Id of the post
    id: PostId,

    /// Restore the post from the trash
    #[arg(long)]
    restore: bool,
}

impl Delete {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        gateway.set_deleted(&self.id, !self.restore).await?;

        if self.restore {
            println!("{}", format!("Restored post {}", self.id).success());
        } else {
            println!("{}", format!("Moved post {} to the trash", self.id).warning());
        }
        Ok(())
    }
}
