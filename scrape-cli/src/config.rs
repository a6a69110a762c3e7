//! Configuration module
//!
//! Handles CLI configuration including the server URL and polling cadence.

use std::time::Duration;

use scrape_tracker::TrackerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the scrape server
    pub server_url: String,

    /// Milliseconds between two progress polls
    pub poll_interval_ms: u64,

    /// Whether to trigger server cleanup once a job has a result
    pub cleanup_after_outcome: bool,
}

impl Config {
    /// Tracker configuration for this invocation
    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig::new(self.server_url.clone())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_cleanup_after_outcome(self.cleanup_after_outcome)
    }
}
