//! conftrack CLI — track conference listings in a local database.
//!
//! Scrapes a conference listings page into a local store and renders a
//! date-filterable report with newly added events highlighted.

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
