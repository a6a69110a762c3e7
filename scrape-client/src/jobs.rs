//! Job-related API endpoints

use crate::ScrapeClient;
use crate::error::{ClientError, Result};
use scrape_core::domain::progress::ProgressSnapshot;
use scrape_core::domain::session::SessionId;
use scrape_core::dto::scrape::{StartScrape, StartScrapeResponse};
use tracing::debug;

impl ScrapeClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Ask the server to start scraping `target_url`
    ///
    /// The acknowledgment body is decoded whatever the status code, because
    /// the server refuses jobs with `400 {success: false, error}`. Only a body
    /// that is not an acknowledgment at all becomes an error.
    ///
    /// # Arguments
    /// * `target_url` - The page to scrape
    ///
    /// # Returns
    /// The server's acknowledgment, accepted or not
    pub async fn start_scrape(&self, target_url: &str) -> Result<StartScrapeResponse> {
        let url = format!("{}/api/scrape", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&StartScrape {
                url: target_url.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<StartScrapeResponse>(&body) {
            Ok(ack) => {
                debug!(
                    "Start acknowledgment (status {}): success={}",
                    status, ack.success
                );
                Ok(ack)
            }
            Err(e) if status.is_success() => Err(ClientError::ParseError(format!(
                "Failed to parse start acknowledgment: {}",
                e
            ))),
            Err(_) => Err(ClientError::api_error(
                status.as_u16(),
                crate::error_message(&body),
            )),
        }
    }

    /// Fetch the current progress of a job
    ///
    /// # Arguments
    /// * `session_id` - The session issued by [`ScrapeClient::start_scrape`]
    ///
    /// # Returns
    /// One progress snapshot; unknown sessions answer 404
    pub async fn get_progress(&self, session_id: &SessionId) -> Result<ProgressSnapshot> {
        let url = format!("{}/api/progress/{}", self.base_url, session_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
