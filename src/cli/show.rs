use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use fconsole::{EditablePost, PostId, TopicCatalog};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show a post as the editor sees it")]
pub struct Show {
    /// Id of the post to show
    id: PostId,

    /// Output format
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    id: &'a PostId,
    #[serde(flatten)]
    post: &'a EditablePost,
    cover_image_url: Option<String>,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        let session = super::start_session(&gateway);

        if session.open(&self.id).await?.is_stale() {
            bail!("post {} changed while loading", self.id);
        }
        let post = session.snapshot().await;
        let urls = gateway.config().image_urls();
        let cover_image_url = post
            .cover_image
            .as_ref()
            .zip(urls.as_ref())
            .map(|(cover, urls)| urls.cover_image(&cover.public_id));

        match self.output {
            OutputFormat::Pretty => output_pretty(&self.id, &post, cover_image_url.as_deref()),
            OutputFormat::Json => {
                let output = ShowOutput {
                    id: &self.id,
                    post: &post,
                    cover_image_url,
                };
                serde_json::to_writer_pretty(std::io::stdout(), &output)?;
                println!();
            }
        }
        Ok(())
    }
}

fn output_pretty(id: &PostId, post: &EditablePost, cover_image_url: Option<&str>) {
    println!("# {}", post.title);
    println!("{}\n", post.description);

    println!("{}", "Metadata".dim());
    println!("  Id:         {id}");
    println!("  Slug:       {}", post.slug);
    let topic = post.topic.as_deref().map_or_else(
        || "-".to_string(),
        |topic| format!("{} ({topic})", TopicCatalog::builtin().name_of(topic)),
    );
    println!("  Topic:      {topic}");
    let visibility = if post.visibility {
        "public".success()
    } else {
        "private".warning()
    };
    println!("  Visibility: {visibility}");
    println!("  License:    {}", post.license);
    println!("  Body:       {}", describe_body(post));

    if !post.tags.is_empty() {
        println!("\n{}", "Tags".dim());
        for tag in &post.tags {
            println!("  • {tag}");
        }
    }

    if let Some(cover) = &post.cover_image {
        println!("\n{}", "Cover image".dim());
        println!("  Path:       {}", cover.public_id);
        if let Some(url) = cover_image_url {
            println!("  URL:        {url}");
        }
        if !cover.ref_name.is_empty() {
            println!("  Credit:     {} {}", cover.ref_name, cover.ref_url.dim());
        }
    }

    if !post.related_posts.is_empty() {
        println!("\n{}", "Related posts".dim());
        for related in &post.related_posts {
            println!("  • {} ({})", related.label, related.id);
        }
    }
}

fn describe_body(post: &EditablePost) -> String {
    let blocks = post
        .body
        .as_ref()
        .and_then(|body| body.get("blocks"))
        .and_then(serde_json::Value::as_array)
        .map(Vec::len);
    match (&post.body, blocks) {
        (None, _) => "empty".to_string(),
        (Some(_), Some(1)) => "1 block".to_string(),
        (Some(_), Some(n)) => format!("{n} blocks"),
        (Some(_), None) => "present".to_string(),
    }
}
