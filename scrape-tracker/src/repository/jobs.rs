//! Jobs repository
//!
//! Handles communication with the scrape server for job tracking:
//! - Starting a job
//! - Fetching progress snapshots
//! - Triggering cleanup of old files

use async_trait::async_trait;
use scrape_client::{Result, ScrapeClient};
use scrape_core::domain::progress::ProgressSnapshot;
use scrape_core::domain::session::SessionId;
use scrape_core::dto::scrape::StartScrapeResponse;

use crate::config::TrackerConfig;

/// Repository trait for job-related operations with the scrape server
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Asks the server to start a job for `target_url`
    ///
    /// A refusal is a successful call returning a negative acknowledgment.
    async fn start_job(&self, target_url: &str) -> Result<StartScrapeResponse>;

    /// Fetches one progress snapshot for a session
    async fn fetch_progress(&self, session_id: &SessionId) -> Result<ProgressSnapshot>;

    /// Asks the server to delete old generated files
    async fn cleanup(&self) -> Result<()>;
}

/// HTTP implementation of JobRepository
#[derive(Debug, Clone)]
pub struct HttpJobRepository {
    client: ScrapeClient,
}

impl HttpJobRepository {
    /// Creates a repository over an existing client
    pub fn new(client: ScrapeClient) -> Self {
        Self { client }
    }

    /// Creates a repository from tracker configuration
    ///
    /// Applies the configured request timeout to the underlying HTTP client.
    pub fn from_config(config: &TrackerConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::new(ScrapeClient::with_client(
            config.server_url.clone(),
            http,
        )))
    }

    /// The underlying API client
    pub fn client(&self) -> &ScrapeClient {
        &self.client
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn start_job(&self, target_url: &str) -> Result<StartScrapeResponse> {
        self.client.start_scrape(target_url).await
    }

    async fn fetch_progress(&self, session_id: &SessionId) -> Result<ProgressSnapshot> {
        self.client.get_progress(session_id).await
    }

    async fn cleanup(&self) -> Result<()> {
        self.client.cleanup().await.map(|_| ())
    }
}
