use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fconsole::{Config, TopicCatalog, domain::Topic, gateway::CONFIG_FILE};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Topics {
    /// Which topics to list
    #[arg(long, value_enum, default_value_t)]
    scope: Scope,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Read topics from a JSON catalog instead of the built-in one
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Scope {
    #[default]
    All,
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicRow<'a> {
    #[serde(flatten)]
    topic: &'a Topic,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumb_url: Option<String>,
}

impl Topics {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let loaded;
        let catalog = match &self.catalog {
            Some(path) => {
                loaded = TopicCatalog::load(path)
                    .with_context(|| format!("failed to load topics from {}", path.display()))?;
                &loaded
            }
            None => TopicCatalog::builtin(),
        };

        let config = Config::load_or_default(&root.join(CONFIG_FILE))?.with_env_overrides();
        let urls = config.image_urls();

        let topics: Vec<&Topic> = match self.scope {
            Scope::All => catalog.list_all().iter().collect(),
            Scope::Public => catalog.list_public().collect(),
            Scope::Private => catalog.list_private().collect(),
        };

        let rows: Vec<TopicRow> = topics
            .into_iter()
            .map(|topic| TopicRow {
                topic,
                thumb_url: urls
                    .as_ref()
                    .filter(|_| !topic.thumb_path.is_empty())
                    .map(|urls| urls.topic_thumb(&topic.thumb_path)),
            })
            .collect();

        match self.output {
            OutputFormat::Table => render_table(&rows),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &rows)?;
                println!();
            }
        }
        Ok(())
    }
}

fn render_table(rows: &[TopicRow]) {
    let id_width = rows.iter().map(|r| r.topic.id.len()).max().unwrap_or(0).max(2);
    let name_width = rows
        .iter()
        .map(|r| r.topic.name.len())
        .max()
        .unwrap_or(0)
        .max(4);

    println!("{:<id_width$}  {:<name_width$}  SCOPE", "ID", "NAME");
    for row in rows {
        let scope = if row.topic.public {
            "public".success()
        } else {
            "private".dim()
        };
        println!(
            "{:<id_width$}  {:<name_width$}  {scope}",
            row.topic.id, row.topic.name
        );
    }
}
