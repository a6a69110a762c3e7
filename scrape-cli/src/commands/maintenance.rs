//! Maintenance command handlers
//!
//! Server cleanup and health checks.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use scrape_client::ScrapeClient;

use crate::config::Config;

/// Ask the server to delete old files
pub async fn cleanup(config: &Config) -> Result<ExitCode> {
    let client = ScrapeClient::new(&config.server_url);

    let response = client
        .cleanup()
        .await
        .context("Failed to trigger server cleanup")?;

    if response.success {
        println!("{}", "✓ Old files cleaned up".green());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "⚠ Server reported that cleanup did not succeed".yellow());
        Ok(ExitCode::FAILURE)
    }
}

/// Check server health
pub async fn health(config: &Config) -> Result<ExitCode> {
    let client = ScrapeClient::new(&config.server_url);

    match client.health().await {
        Ok(status) if status.is_ok() => {
            println!(
                "{} Server at {} is {}",
                "✓".green(),
                client.base_url().bold(),
                status.status.green()
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(status) => {
            println!(
                "{} Server at {} reported {}",
                "⚠".yellow(),
                client.base_url().bold(),
                status.status.yellow()
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            println!(
                "{} Server at {} is unreachable: {}",
                "✗".red(),
                client.base_url().bold(),
                e
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
