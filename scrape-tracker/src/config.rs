//! Tracker configuration
//!
//! Defines the server connection and polling cadence used by the job client.

use std::time::Duration;

/// Default cadence between two progress polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Tracker configuration
///
/// The interval and timeout are configurable so tests and slow networks can
/// tune them without touching the tracking logic.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Scrape server base URL (e.g., "http://localhost:5001")
    pub server_url: String,

    /// How often to poll the server for job progress
    pub poll_interval: Duration,

    /// Whether to ask the server to clean old files once a job has a result
    pub cleanup_after_outcome: bool,

    /// Per-request timeout; `None` keeps the HTTP client's default
    pub request_timeout: Option<Duration>,
}

impl TrackerConfig {
    /// Creates a new configuration with defaults
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            cleanup_after_outcome: true,
            request_timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SCRAPE_SERVER_URL (required)
    /// - POLL_INTERVAL_MS (optional, milliseconds, default: 1000)
    /// - CLEANUP_AFTER_OUTCOME (optional, true/false, default: true)
    /// - REQUEST_TIMEOUT_SECS (optional, seconds, default: none)
    pub fn from_env() -> anyhow::Result<Self> {
        let server_url = std::env::var("SCRAPE_SERVER_URL")
            .map_err(|_| anyhow::anyhow!("SCRAPE_SERVER_URL environment variable not set"))?;

        let poll_interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let cleanup_after_outcome = std::env::var("CLEANUP_AFTER_OUTCOME")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(true);

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        Ok(Self {
            server_url,
            poll_interval,
            cleanup_after_outcome,
            request_timeout,
        })
    }

    /// Overrides the poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Overrides automatic cleanup
    pub fn with_cleanup_after_outcome(mut self, enabled: bool) -> Self {
        self.cleanup_after_outcome = enabled;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server_url cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new("http://localhost:5001")
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
