//! Cleanup, health and download endpoints

use crate::ScrapeClient;
use crate::error::{ClientError, Result};
use scrape_core::domain::outcome::DownloadRef;
use scrape_core::dto::scrape::{CleanupResponse, HealthStatus};
use url::Url;

impl ScrapeClient {
    // =============================================================================
    // Maintenance
    // =============================================================================

    /// Ask the server to delete old generated files
    ///
    /// Callers treat this as best-effort; the body is read but not required.
    pub async fn cleanup(&self) -> Result<CleanupResponse> {
        let url = format!("{}/api/cleanup", self.base_url);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(crate::api_error_from(response).await);
        }

        // an empty or odd body still counts as done
        Ok(response
            .json()
            .await
            .unwrap_or(CleanupResponse { success: true }))
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Downloads
    // =============================================================================

    /// Resolve a download link against the server base URL
    ///
    /// Links are usually relative (`/download/clinics.csv`); absolute links
    /// are used as given.
    pub fn resolve_download_url(&self, download: &DownloadRef) -> Result<Url> {
        if let Ok(absolute) = Url::parse(&download.url) {
            return Ok(absolute);
        }

        let base = Url::parse(&format!("{}/", self.base_url)).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;

        base.join(&download.url).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid download link {}: {}", download.url, e))
        })
    }

    /// Fetch the file behind a download reference
    pub async fn download(&self, download: &DownloadRef) -> Result<Vec<u8>> {
        let url = self.resolve_download_url(download)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(download.filename.clone()));
        }

        if !status.is_success() {
            return Err(crate::api_error_from(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}
