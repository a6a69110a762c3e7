//! Terminal presenter
//!
//! Renders job progress and outcomes to stdout.

use colored::*;
use scrape_core::domain::outcome::{NormalizedOutcome, OutcomeStatus};
use scrape_core::domain::progress::ProgressSnapshot;
use scrape_tracker::PresentationAdapter;

const BAR_WIDTH: usize = 30;

/// Prints one line per progress change
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    last_line: Option<String>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationAdapter for TerminalPresenter {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let line = progress_line(snapshot);
        // The server repeats snapshots while a step runs
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }
        println!("{}", line);
        self.last_line = Some(line);
    }

    fn on_outcome(&mut self, outcome: &NormalizedOutcome) {
        println!();
        print_outcome(outcome);
    }

    fn on_start_error(&mut self, message: &str) {
        println!("{} {}", "✗".red(), message.red());
    }

    fn reset_presentation(&mut self) {
        self.last_line = None;
    }
}

/// Print an outcome summary
pub fn print_outcome(outcome: &NormalizedOutcome) {
    match outcome.status {
        OutcomeStatus::Success => println!("{} {}", "✓".green(), outcome.message.green()),
        OutcomeStatus::SuccessFallback => {
            println!("{} {}", "⚠".yellow(), outcome.message.yellow())
        }
        OutcomeStatus::Failure => println!("{} {}", "✗".red(), outcome.message.red()),
    }

    if let Some(download) = &outcome.download {
        println!("    File:         {}", download.filename.bold());
        println!("    Download:     {}", download.url.dimmed());
    }
}

/// Print a single snapshot with its fields
pub fn print_snapshot(snapshot: &ProgressSnapshot) {
    println!("{}", progress_line(snapshot));
    println!(
        "    Completed:    {}",
        if snapshot.completed {
            "yes".green()
        } else {
            "no".yellow()
        }
    );
    if let Some(count) = &snapshot.clinic_count {
        println!("    Clinics:      {}", count);
    }
    if let Some(result) = &snapshot.result {
        println!(
            "    Result:       {}",
            if result.success {
                "confirmed".green()
            } else {
                "not confirmed".yellow()
            }
        );
        if let Some(error) = &result.error {
            println!("    Error:        {}", error.red());
        }
    }
}

fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let percentage = snapshot.clamped_percentage();
    let mut line = format!(
        "[{}] {:>3}% {}",
        bar(percentage),
        percentage,
        snapshot.status.bold()
    );

    if !snapshot.current_action.is_empty() {
        line.push_str(&format!(" - {}", snapshot.current_action));
    }
    if let (Some(done), Some(total)) = (snapshot.progress, snapshot.total) {
        line.push_str(&format!(" ({}/{})", done, total).dimmed().to_string());
    }

    line
}

fn bar(percentage: u8) -> String {
    let filled = usize::from(percentage) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_is_fixed() {
        assert_eq!(bar(0), "-".repeat(BAR_WIDTH));
        assert_eq!(bar(100), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(50).len(), BAR_WIDTH);
    }

    #[test]
    fn test_progress_line_includes_step_counts() {
        colored::control::set_override(false);
        let snapshot = ProgressSnapshot {
            percentage: 140,
            status: "scraping".to_string(),
            current_action: "page 3".to_string(),
            progress: Some(3),
            total: Some(10),
            ..Default::default()
        };

        let line = progress_line(&snapshot);
        assert!(line.contains("100%"));
        assert!(line.contains("scraping - page 3"));
        assert!(line.ends_with("(3/10)"));
    }

    #[test]
    fn test_repeated_snapshot_is_printed_once() {
        let mut presenter = TerminalPresenter::new();
        let snapshot = ProgressSnapshot {
            percentage: 10,
            ..Default::default()
        };

        presenter.on_progress(&snapshot);
        let first = presenter.last_line.clone();
        presenter.on_progress(&snapshot);
        assert_eq!(presenter.last_line, first);

        presenter.reset_presentation();
        assert!(presenter.last_line.is_none());
    }
}
