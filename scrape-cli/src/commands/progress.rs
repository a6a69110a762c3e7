//! Progress command handler

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use scrape_client::ScrapeClient;
use scrape_core::domain::session::SessionId;
use scrape_core::reconcile::reconcile_snapshot;

use crate::config::Config;
use crate::presenter::{print_outcome, print_snapshot};

/// Fetch and display one progress snapshot
///
/// A finished job is also shown with its reconciled outcome.
pub async fn show_progress(config: &Config, session_id: &str, json: bool) -> Result<ExitCode> {
    let client = ScrapeClient::new(&config.server_url);
    let session_id = SessionId::new(session_id.trim());

    let snapshot = match client.get_progress(&session_id).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_not_found() => {
            println!("{}", format!("No job found for session {}", session_id).yellow());
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to fetch progress for {}", session_id));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", format!("Session {}:", session_id).bold());
    print_snapshot(&snapshot);

    if snapshot.is_terminal() {
        println!();
        print_outcome(&reconcile_snapshot(&snapshot));
    }

    Ok(ExitCode::SUCCESS)
}
