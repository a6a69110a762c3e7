//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod maintenance;
mod progress;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start a scrape job and follow it until it finishes
    Run {
        /// Page to scrape
        url: String,

        /// Save the generated file into this directory
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },
    /// Show the current progress of a job
    Progress {
        /// Session ID returned when the job was started
        session_id: String,

        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the server to delete old generated files
    Cleanup,
    /// Check that the server is up
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// The process exit code
pub async fn handle_command(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Run { url, download_dir } => run::run_job(config, &url, download_dir).await,
        Commands::Progress { session_id, json } => {
            progress::show_progress(config, &session_id, json).await
        }
        Commands::Cleanup => maintenance::cleanup(config).await,
        Commands::Health => maintenance::health(config).await,
    }
}
