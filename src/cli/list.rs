use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use fconsole::{
    PostGateway, TopicCatalog,
    domain::PostMetadataDocument,
    gateway::{ListOptions, SortBy},
};
use tracing::instrument;

use super::terminal::{Colorize, format_time, is_narrow, truncate_text};

const TITLE_WIDTH: usize = 36;
const NARROW_TITLE_WIDTH: usize = 24;

#[derive(Debug, Parser)]
#[command(about = "List posts")]
pub struct List {
    /// List private posts instead of public ones
    #[arg(long)]
    private: bool,

    /// Only list posts under this topic id
    #[arg(long, value_name = "ID")]
    topic: Option<String>,

    /// Sort order (title, topic, newest, oldest or updated)
    #[arg(long, default_value_t)]
    sort: SortBy,

    /// Maximum number of posts to list (0 for no limit)
    #[arg(long, default_value_t = 0)]
    limit: u64,

    /// Number of posts to skip
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub async fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let gateway = super::open_store(root)?;
        let options = ListOptions {
            private: self.private,
            topic: self.topic,
            sort_by: self.sort,
            limit: self.limit,
            skip: self.skip,
        };
        let posts = gateway.list_metadata(&options).await?;

        match self.output {
            OutputFormat::Table => render_table(&posts),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &posts)?;
                println!();
            }
        }
        Ok(())
    }
}

fn render_table(posts: &[PostMetadataDocument]) {
    if posts.is_empty() {
        println!("{}", "No posts found".dim());
        return;
    }

    let topics = TopicCatalog::builtin();
    let now = Utc::now();
    let title_width = if is_narrow() {
        NARROW_TITLE_WIDTH
    } else {
        TITLE_WIDTH
    };

    let rows: Vec<[String; 4]> = posts
        .iter()
        .map(|post| {
            [
                post.id.to_string(),
                truncate_text(&post.title, title_width),
                topics.name_of(&post.topic).to_string(),
                format_time(post.created_at, now),
            ]
        })
        .collect();

    let headers = ["ID", "TITLE", "TOPIC", "CREATED"];
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}
