use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

mod delete;
mod edit;
mod image;
mod init;
mod list;
mod new;
mod publish;
mod show;
mod terminal;
mod topics;

use anyhow::Context;
use clap::ArgAction;
use delete::Delete;
use edit::Edit;
use fconsole::{
    EditorSession, FileGateway, PostGateway, PostId, TopicCatalog,
    domain::{FALLBACK_TOPIC_NAME, RelatedPost},
};
use image::Image;
use init::Init;
use list::List;
use new::New;
use publish::Publish;
use show::Show;
use topics::Topics;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the post store
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root).await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Initialize a new post store
    Init(Init),

    /// List the topics posts can be classified under
    Topics(Topics),

    /// List posts
    List(List),

    /// Show a post as the editor sees it
    Show(Show),

    /// Create a new post
    New(New),

    /// Edit an existing post
    Edit(Edit),

    /// Make a post public, or private again
    Publish(Publish),

    /// Move a post to the trash, or restore it
    Delete(Delete),

    /// Upload an image for embedding in a post body
    Image(Image),
}

impl Command {
    async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Topics(command) => command.run(&root)?,
            Self::List(command) => command.run(root).await?,
            Self::Show(command) => command.run(root).await?,
            Self::New(command) => command.run(root).await?,
            Self::Edit(command) => command.run(root).await?,
            Self::Publish(command) => command.run(root).await?,
            Self::Delete(command) => command.run(root).await?,
            Self::Image(command) => command.run(root).await?,
        }
        Ok(())
    }
}

/// Open the post store at `root`.
fn open_store(root: PathBuf) -> anyhow::Result<Arc<FileGateway>> {
    let display = root.display().to_string();
    let gateway = FileGateway::open(root)
        .with_context(|| format!("failed to open post store at {display}"))?;
    Ok(Arc::new(gateway))
}

/// Start an editing session over an opened store, honouring its cover image
/// policy.
fn start_session(gateway: &Arc<FileGateway>) -> EditorSession {
    let policy = gateway.config().cover_image_policy();
    EditorSession::new(gateway.clone(), policy)
}

fn read_body(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read body from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("body in {} is not valid JSON", path.display()))
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))
}

/// Resolve a post id into a related-post reference labelled with its title.
async fn related_post(gateway: &FileGateway, id: &PostId) -> anyhow::Result<RelatedPost> {
    let post = gateway
        .fetch_post(id)
        .await
        .with_context(|| format!("related post {id} not found"))?;
    Ok(RelatedPost::new(post.title, id.as_str()))
}

/// The author new posts are attributed to: the explicit one, else the
/// configured admin id.
fn author_id(explicit: Option<String>, gateway: &FileGateway) -> anyhow::Result<String> {
    explicit
        .or_else(|| gateway.config().admin_id.clone())
        .context("no author: pass --author, set admin_id in the config or FMC_ADMIN_ID")
}

fn warn_unknown_topic(topic: &str) {
    if !TopicCatalog::builtin().contains(topic) {
        tracing::warn!(%topic, "unknown topic, listed as '{FALLBACK_TOPIC_NAME}'");
    }
}
