//! Run command handler
//!
//! Starts a job, follows it with the terminal presenter and optionally saves
//! the generated file. Ctrl-C stops tracking without waiting for the server.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use scrape_client::ScrapeClient;
use scrape_core::domain::outcome::{DownloadRef, NormalizedOutcome};
use scrape_tracker::JobClient;
use tracing::info;

use crate::config::Config;
use crate::presenter::TerminalPresenter;

/// Exit code used when the user interrupts tracking
const INTERRUPTED: u8 = 130;

/// How long to wait for the server cleanup before exiting
const CLEANUP_GRACE: Duration = Duration::from_secs(5);

/// Run a job to completion
pub async fn run_job(config: &Config, url: &str, download_dir: Option<PathBuf>) -> Result<ExitCode> {
    let tracker_config = config.tracker();
    let mut client = JobClient::from_config(&tracker_config, TerminalPresenter::new())
        .context("Invalid tracker configuration")?;

    // The presenter has already shown why the job did not start
    let Ok(session_id) = client.start_job(url).await else {
        return Ok(ExitCode::FAILURE);
    };

    println!(
        "{} Job started (session {})",
        "▸".cyan(),
        session_id.as_str().bold()
    );
    let session = client.session().cloned();

    let outcome = tokio::select! {
        outcome = client.track() => outcome,
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(outcome) = outcome else {
        client.cancel();
        println!();
        println!("{}", "Stopped following the job.".yellow());
        println!(
            "{}",
            format!(
                "  It may still be running: scrape progress {}",
                session_id
            )
            .dimmed()
        );
        return Ok(ExitCode::from(INTERRUPTED));
    };

    if let Some(session) = &session {
        println!(
            "{}",
            format!("  Finished in {}s", session.elapsed().num_seconds()).dimmed()
        );
    }

    // The runtime shuts down when this returns, which would cancel the request
    client.finish_cleanup(CLEANUP_GRACE).await;

    if outcome.is_failure() {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(dir) = download_dir {
        save_download(config, &outcome, &dir).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Download the job's file into `dir`
async fn save_download(config: &Config, outcome: &NormalizedOutcome, dir: &Path) -> Result<()> {
    let Some(download) = &outcome.download else {
        println!("{}", "⚠ The job produced no file to download".yellow());
        return Ok(());
    };

    let client = ScrapeClient::new(&config.server_url);
    let bytes = client
        .download(download)
        .await
        .with_context(|| format!("Failed to download {}", download.filename))?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(local_file_name(download));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} bytes to {}", bytes.len(), path.display());
    println!("{} Saved {}", "✓".green(), path.display().to_string().bold());

    Ok(())
}

/// File name to save a download under, never leaving the target directory
fn local_file_name(download: &DownloadRef) -> PathBuf {
    Path::new(&download.filename)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("clinics.xlsx"))
}
