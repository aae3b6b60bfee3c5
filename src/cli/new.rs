use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use fconsole::{Outcome, PostId};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Create a new post")]
pub struct New {
    /// Post title
    #[arg(long)]
    title: String,

    /// URL slug (derived from the title when omitted)
    #[arg(long)]
    slug: Option<String>,

    /// Topic id
    #[arg(long)]
    topic: Option<String>,

    /// Short description
    #[arg(long, default_value = "")]
    desc: String,

    /// Tag to attach (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Keep the post private
    #[arg(long)]
    private: bool,

    /// License identifier
    #[arg(long)]
    license: Option<String>,

    /// JSON file holding the post body
    #[arg(long, value_name = "FILE")]
    body: Option<PathBuf>,

    /// Id of a related post (repeatable)
    #[arg(long = "related", value_name = "ID")]
    related: Vec<PostId>,

    /// Image file to upload as the cover image
    #[arg(long, value_name = "FILE")]
    cover: Option<PathBuf>,

    /// Attribution name for the cover image
    #[arg(long, requires = "cover", default_value = "")]
    cover_credit: String,

    /// Attribution link for the cover image
    #[arg(long, requires = "cover", default_value = "")]
    cover_credit_url: String,

    /// Author id (defaults to the configured admin id)
    #[arg(long)]
    author: Option<String>,
}

impl New {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        let author = super::author_id(self.author, &gateway)?;

        if let Some(topic) = &self.topic {
            super::warn_unknown_topic(topic);
        }
        let body = self.body.as_deref().map(super::read_body).transpose()?;
        let mut related = Vec::with_capacity(self.related.len());
        for id in &self.related {
            related.push(super::related_post(&gateway, id).await?);
        }

        let session = super::start_session(&gateway);
        session
            .edit(|post| {
                post.title = self.title;
                post.slug = self.slug.unwrap_or_default();
                post.topic = self.topic;
                post.description = self.desc;
                for tag in &self.tags {
                    post.add_tag(tag);
                }
                post.visibility = !self.private;
                if let Some(license) = self.license {
                    post.license = license;
                }
                post.body = body;
                for related in related {
                    post.add_related_post(related);
                }
            })
            .await;

        if let Some(path) = &self.cover {
            let data = super::read_image(path)?;
            let outcome = session
                .replace_cover_image(data, self.cover_credit, self.cover_credit_url)
                .await?;
            if outcome.is_stale() {
                bail!("the editor moved on while uploading the cover image");
            }
        }

        let Outcome::Applied(id) = session.save(&author).await? else {
            bail!("post was saved but the editor moved on before it finished");
        };
        let post = session.snapshot().await;
        println!(
            "{}",
            format!("Created post {id} ({})", post.effective_slug()).success()
        );
        Ok(())
    }
}
