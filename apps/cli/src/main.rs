//! PolicyTracker CLI — batch ingestion of enriched legislative bill records.
//!
//! Pulls recent bills from Congress.gov, enriches them with topic tags and
//! generated summaries/analyses, and stores them locally for inspection.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
