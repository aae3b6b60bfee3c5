//! `fconsole`: author and publish blog posts from the command line.

use clap::Parser;

mod cli;
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Cli::parse().run().await
}
