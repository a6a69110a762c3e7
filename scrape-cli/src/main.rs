//! Scrape CLI
//!
//! Command-line interface for starting and following scrape jobs.

mod commands;
mod config;
mod presenter;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scrape")]
#[command(about = "Start and follow clinic scrape jobs", long_about = None)]
struct Cli {
    /// Scrape server URL
    #[arg(long, env = "SCRAPE_SERVER_URL", default_value = "http://localhost:5001")]
    server_url: String,

    /// Milliseconds between two progress polls
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Do not ask the server to delete old files after a job finishes
    #[arg(long)]
    no_cleanup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so they don't interleave with the progress display
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrape=info,scrape_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        poll_interval_ms: cli.poll_interval_ms,
        cleanup_after_outcome: !cli.no_cleanup,
    };

    handle_command(cli.command, &config).await
}
