//! Errors surfaced by the job client
//!
//! Transport errors from [`scrape_client`] never reach callers directly; they
//! are converted here, at the boundary where they occur.

use scrape_client::ClientError;
use thiserror::Error;

/// Shown when the server refuses a job without saying why
pub const GENERIC_START_FAILURE: &str = "Could not start the job.";

/// Shown when the server could not be reached or answered gibberish
pub const COMMUNICATION_FAILURE: &str = "Failed to communicate with the server.";

/// Shown when a progress request got a non-success status
pub const PROGRESS_FAILURE: &str = "Failed to fetch job progress.";

/// A job could not be created; no job state exists afterwards
#[derive(Debug, Error)]
pub enum StartError {
    /// The target is not an absolute URL
    #[error("Invalid target URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server answered with a negative acknowledgment
    #[error("Server refused to start the job: {message}")]
    Rejected { message: String },

    /// The start request failed in transit
    #[error("Start request failed: {0}")]
    Transport(#[source] ClientError),
}

impl StartError {
    /// Build a rejection, falling back to the generic text
    pub fn rejected(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_START_FAILURE);
        Self::Rejected {
            message: message.to_string(),
        }
    }

    /// The single message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            StartError::InvalidUrl { url, .. } => format!("Invalid URL: {}", url),
            StartError::Rejected { message } => message.clone(),
            StartError::Transport(_) => {
                format!("{} {}", GENERIC_START_FAILURE, COMMUNICATION_FAILURE)
            }
        }
    }
}

/// Polling stopped before the job reported completion
///
/// Poll failures are not retried: the first one ends tracking with a
/// `Failure` outcome.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The server answered with a non-success status
    #[error("Progress request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Progress request failed: {0}")]
    Transport(String),

    /// The response body was not a progress snapshot
    #[error("Progress response could not be decoded: {0}")]
    Decode(String),

    /// The polling task ended without reporting a result
    #[error("Progress poller stopped before the job finished")]
    PollerStopped,
}

impl PollError {
    /// The single message shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            PollError::Status { .. } | PollError::PollerStopped => PROGRESS_FAILURE,
            PollError::Transport(_) | PollError::Decode(_) => COMMUNICATION_FAILURE,
        }
    }
}

impl From<ClientError> for PollError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, message } => PollError::Status { status, message },
            ClientError::NotFound(message) => PollError::Status {
                status: 404,
                message,
            },
            ClientError::ParseError(message) => PollError::Decode(message),
            ClientError::RequestFailed(e) if e.is_decode() => PollError::Decode(e.to_string()),
            other => PollError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_falls_back_to_generic_message() {
        assert_eq!(StartError::rejected(None).user_message(), GENERIC_START_FAILURE);
        assert_eq!(
            StartError::rejected(Some("  ")).user_message(),
            GENERIC_START_FAILURE
        );
        assert_eq!(
            StartError::rejected(Some("URL is required")).user_message(),
            "URL is required"
        );
    }

    #[test]
    fn test_poll_error_from_client_error() {
        let err = PollError::from(ClientError::api_error(500, "boom"));
        assert!(matches!(err, PollError::Status { status: 500, .. }));
        assert_eq!(err.user_message(), PROGRESS_FAILURE);

        let err = PollError::from(ClientError::NotFound("abc".to_string()));
        assert!(matches!(err, PollError::Status { status: 404, .. }));

        let err = PollError::from(ClientError::ParseError("eof".to_string()));
        assert_eq!(err.user_message(), COMMUNICATION_FAILURE);

        let err = PollError::from(ClientError::InvalidRequest("bad".to_string()));
        assert!(matches!(err, PollError::Transport(_)));
    }

    #[test]
    fn test_stopped_poller_reads_as_progress_failure() {
        assert_eq!(PollError::PollerStopped.user_message(), PROGRESS_FAILURE);
    }
}
