use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use fconsole::{
    EditablePost, EditorSession, FileGateway, PostId,
    domain::RelatedPost,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Edit an existing post")]
pub struct Edit {
    /// Id of the post to edit
    id: PostId,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New URL slug (pass an empty string to derive it from the title)
    #[arg(long)]
    slug: Option<String>,

    /// New topic id
    #[arg(long)]
    topic: Option<String>,

    /// New description
    #[arg(long)]
    desc: Option<String>,

    /// Tag to add (repeatable)
    #[arg(long, value_name = "TAG")]
    add_tag: Vec<String>,

    /// Tag to remove (repeatable)
    #[arg(long, value_name = "TAG")]
    remove_tag: Vec<String>,

    /// Make the post public
    #[arg(long, conflicts_with = "private")]
    public: bool,

    /// Make the post private
    #[arg(long)]
    private: bool,

    /// New license identifier
    #[arg(long)]
    license: Option<String>,

    /// JSON file holding the new body
    #[arg(long, value_name = "FILE")]
    body: Option<PathBuf>,

    /// Id of a post to relate (repeatable)
    #[arg(long, value_name = "ID")]
    add_related: Vec<PostId>,

    /// Id of a related post to drop (repeatable)
    #[arg(long, value_name = "ID")]
    remove_related: Vec<String>,

    /// Image file to upload as the new cover image
    #[arg(long, value_name = "FILE", conflicts_with = "remove_cover")]
    cover: Option<PathBuf>,

    /// Attribution name for the new cover image
    #[arg(long, requires = "cover", default_value = "")]
    cover_credit: String,

    /// Attribution link for the new cover image
    #[arg(long, requires = "cover", default_value = "")]
    cover_credit_url: String,

    /// Remove the cover image
    #[arg(long)]
    remove_cover: bool,
}

impl Edit {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        let session = super::start_session(&gateway);

        if session.open(&self.id).await?.is_stale() {
            bail!("post {} changed while loading", self.id);
        }

        if let Some(topic) = &self.topic {
            super::warn_unknown_topic(topic);
        }
        let body = self.body.as_deref().map(super::read_body).transpose()?;
        let related = self.resolve_related(&gateway).await?;

        let ignored = session.edit(|post| self.apply(post, body, related)).await;
        for message in ignored {
            eprintln!("{}", format!("Skipped: {message}").warning());
        }

        self.update_cover(&session).await?;

        if session.save("").await?.is_stale() {
            bail!("post {} was saved but the editor moved on before it finished", self.id);
        }
        println!("{}", format!("Updated post {}", self.id).success());
        Ok(())
    }

    async fn resolve_related(&self, gateway: &FileGateway) -> anyhow::Result<Vec<RelatedPost>> {
        let mut related = Vec::with_capacity(self.add_related.len());
        for id in &self.add_related {
            if *id == self.id {
                bail!("a post cannot be related to itself");
            }
            related.push(super::related_post(gateway, id).await?);
        }
        Ok(related)
    }

    const fn visibility(&self) -> Option<bool> {
        match (self.public, self.private) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Apply the field changes, returning a message for each one that had
    /// nothing to do.
    fn apply(
        &self,
        post: &mut EditablePost,
        body: Option<serde_json::Value>,
        related: Vec<RelatedPost>,
    ) -> Vec<String> {
        if let Some(title) = &self.title {
            post.title.clone_from(title);
        }
        if let Some(slug) = &self.slug {
            post.slug.clone_from(slug);
        }
        if let Some(topic) = &self.topic {
            post.topic = (!topic.is_empty()).then(|| topic.clone());
        }
        if let Some(desc) = &self.desc {
            post.description.clone_from(desc);
        }
        if let Some(visibility) = self.visibility() {
            post.visibility = visibility;
        }
        if let Some(license) = &self.license {
            post.license.clone_from(license);
        }
        if body.is_some() {
            post.body = body;
        }

        let mut ignored = Vec::new();
        for tag in &self.add_tag {
            if !post.add_tag(tag) {
                ignored.push(format!("tag '{tag}' already present"));
            }
        }
        for tag in &self.remove_tag {
            if !post.remove_tag(tag) {
                ignored.push(format!("tag '{tag}' not present"));
            }
        }
        for related in related {
            let id = related.id.clone();
            if !post.add_related_post(related) {
                ignored.push(format!("post {id} already related"));
            }
        }
        for id in &self.remove_related {
            if post.remove_related_post(id).is_none() {
                ignored.push(format!("post {id} not related"));
            }
        }
        ignored
    }

    async fn update_cover(&self, session: &EditorSession) -> anyhow::Result<()> {
        if let Some(path) = &self.cover {
            let data = super::read_image(path)?;
            let outcome = session
                .replace_cover_image(
                    data,
                    self.cover_credit.clone(),
                    self.cover_credit_url.clone(),
                )
                .await?;
            if outcome.is_stale() {
                bail!("post {} changed while uploading the cover image", self.id);
            }
        } else if self.remove_cover && session.remove_cover_image().await.is_none() {
            eprintln!("{}", "Skipped: post has no cover image".warning());
        }
        Ok(())
    }
}
