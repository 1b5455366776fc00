//! storyfeed: scheduled Hacker News ingestion job.
//!
//! Fetches the current top stories, crawls the new ones, rewrites them into
//! the configured language, and keeps a rank-ordered JSON record set.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
