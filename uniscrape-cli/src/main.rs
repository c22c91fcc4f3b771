//! Uniscrape CLI - Command-line interface
//!
//! Runs the API server or performs one-off lookups from the terminal.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use uniscrape_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "uniscrape")]
#[command(about = "Unified movie and TV search, details and stream lookup")]
#[command(version)]
struct Cli {
    /// Console log level
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    /// Directory for the full-trace log file
    #[arg(long, global = true, default_value = "logs")]
    logs_dir: PathBuf,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), Some(&cli.logs_dir))?;

    commands::handle_command(cli.command).await
}
