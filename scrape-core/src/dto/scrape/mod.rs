//! Scrape job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::session::SessionId;

/// Request to start a scrape job (`POST /api/scrape`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartScrape {
    pub url: String,
}

/// Acknowledgment of a start request
///
/// The server answers `{success: true, session_id}` when the job was created
/// and `{success: false, error}` when it was refused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StartScrapeResponse {
    /// The issued session, if the server accepted the job
    pub fn accepted_session(&self) -> Option<&SessionId> {
        if self.success {
            self.session_id.as_ref().filter(|id| !id.as_str().is_empty())
        } else {
            None
        }
    }
}

/// Reply to `POST /api/cleanup`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupResponse {
    #[serde(default)]
    pub success: bool,
}

/// Reply to `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepted_session() {
        let response: StartScrapeResponse = serde_json::from_value(json!({
            "success": true,
            "session_id": "1718000000000"
        }))
        .unwrap();

        assert_eq!(
            response.accepted_session(),
            Some(&SessionId::new("1718000000000"))
        );
    }

    #[test]
    fn test_rejection_has_no_session() {
        let response: StartScrapeResponse = serde_json::from_value(json!({
            "success": false,
            "error": "no url given"
        }))
        .unwrap();

        assert!(response.accepted_session().is_none());
        assert_eq!(response.error.as_deref(), Some("no url given"));
    }

    #[test]
    fn test_success_without_session_is_not_accepted() {
        let response: StartScrapeResponse =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(response.accepted_session().is_none());

        let response: StartScrapeResponse =
            serde_json::from_value(json!({ "success": true, "session_id": "" })).unwrap();
        assert!(response.accepted_session().is_none());
    }
}
