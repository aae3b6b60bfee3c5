use std::path::PathBuf;

use clap::Parser;
use fconsole::{PostGateway, PostId};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Make a post public, or private again")]
pub struct Publish {
    /// Id of the post
    id: PostId,

    /// Make the post private instead
    #[arg(long)]
    undo: bool,
}

impl Publish {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        gateway.set_visibility(&self.id, !self.undo).await?;

        let message = if self.undo {
            format!("Post {} is now private", self.id)
        } else {
            format!("Post {} is now public", self.id)
        };
        println!("{}", message.success());

        let public = gateway.count_posts(true, false).await?;
        let private = gateway.count_posts(false, false).await?;
        println!("{}", format!("{public} public, {private} private").dim());
        Ok(())
    }
}
