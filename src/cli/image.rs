use std::path::PathBuf;

use clap::Parser;
use fconsole::{PostGateway, domain::ImageFolder};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Upload an image for embedding in a post body")]
pub struct Image {
    /// Image file to upload
    file: PathBuf,
}

impl Image {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        let data = super::read_image(&self.file)?;
        let image = gateway.upload_image(ImageFolder::Embed, data).await?;

        println!("{}", format!("Uploaded {}", image.public_id).success());
        if let Some(urls) = gateway.config().image_urls() {
            println!("  URL: {}", urls.embedded_image(&image.public_id));
        }
        Ok(())
    }
}
