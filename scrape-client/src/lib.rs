//! Scrape HTTP Client
//!
//! A small, type-safe HTTP client for the scrape server API.
//!
//! Both the job tracker and the CLI talk to the server through this crate, so
//! status handling and error-body parsing live in one place.
//!
//! # Example
//!
//! ```no_run
//! use scrape_client::ScrapeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ScrapeClient::new("http://localhost:5001");
//!
//!     let ack = client.start_scrape("https://example.com/clinic/").await?;
//!     if let Some(session_id) = ack.accepted_session() {
//!         let snapshot = client.get_progress(session_id).await?;
//!         println!("{}% {}", snapshot.percentage, snapshot.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod maintenance;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use scrape_core::domain::progress::ProgressSnapshot;
pub use scrape_core::dto::scrape::StartScrapeResponse;

use reqwest::Client;
use scrape_core::dto::scrape::ErrorBody;
use serde::de::DeserializeOwned;

/// HTTP client for the scrape server API
///
/// Endpoints are grouped into:
/// - Job lifecycle (start, progress)
/// - Maintenance (cleanup, health, file download)
#[derive(Debug, Clone)]
pub struct ScrapeClient {
    /// Base URL of the server (e.g., "http://localhost:5001")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ScrapeClient {
    /// Create a new scrape client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the scrape server (e.g., "http://localhost:5001")
    ///
    /// # Example
    /// ```
    /// use scrape_client::ScrapeClient;
    ///
    /// let client = ScrapeClient::new("http://localhost:5001");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a scrape client over a preconfigured `reqwest` client
    ///
    /// Use this to bound how long a single poll may hang.
    ///
    /// ```
    /// use std::time::Duration;
    /// use scrape_client::ScrapeClient;
    ///
    /// let http = reqwest::Client::builder()
    ///     .connect_timeout(Duration::from_secs(2))
    ///     .timeout(Duration::from_secs(10))
    ///     .build()?;
    /// let client = ScrapeClient::with_client("http://localhost:5001/", http);
    /// assert_eq!(client.base_url(), "http://localhost:5001");
    /// # Ok::<(), reqwest::Error>(())
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::ApiError`], with the
    /// server's `{error}` text extracted when the body carries one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(api_error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Turn a non-success response into an [`ClientError::ApiError`]
async fn api_error_from(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ClientError::api_error(status.as_u16(), error_message(&error_text))
}

/// Pull the message out of an `{"error": "..."}` body, or fall back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
