//! Normalized outcome domain types
//!
//! Every job ends in exactly one [`NormalizedOutcome`], whatever shape the
//! server's terminal payload had.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Final status of a job as presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// The server confirmed the result
    Success,
    /// The job finished but the result was missing or contradictory
    SuccessFallback,
    /// Tracking failed before the job finished
    Failure,
}

impl OutcomeStatus {
    /// Whether the outcome carries an item count
    pub fn is_success_shaped(&self) -> bool {
        !matches!(self, OutcomeStatus::Failure)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "Success"),
            OutcomeStatus::SuccessFallback => write!(f, "SuccessFallback"),
            OutcomeStatus::Failure => write!(f, "Failure"),
        }
    }
}

/// A file the server produced for the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRef {
    pub url: String,
    pub filename: String,
}

/// Which row of the reconciliation table produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileBranch {
    /// `result.success == true`
    Primary,
    /// `result.success == false`, recovered from the top-level count
    ResultNotConfirmed,
    /// No `result` object, recovered from the top-level count
    ResultMissing,
    /// Transport or HTTP failure while polling
    PollFailed,
}

/// Irregularities noticed while reconciling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticFlag {
    /// The final count is zero
    ZeroCount,
    /// The count source was absent or null
    MissingCount,
    /// The count was a float or a string and had to be converted
    CoercedCount,
    /// The count could not be read as a number at all
    NonNumericCount,
    /// The count was negative
    NegativeCount,
    /// A success-shaped outcome has no usable download target
    DownloadMissing,
}

/// Structured trace of how an outcome was derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub branch: ReconcileBranch,
    /// `result.clinic_count` exactly as received
    pub raw_result_count: Option<JsonValue>,
    /// Top-level `clinic_count` exactly as received
    pub raw_top_level_count: Option<JsonValue>,
    /// Error text reported by the server or the transport
    pub server_error: Option<String>,
    pub flags: Vec<DiagnosticFlag>,
}

impl Diagnostic {
    pub fn new(branch: ReconcileBranch) -> Self {
        Self {
            branch,
            raw_result_count: None,
            raw_top_level_count: None,
            server_error: None,
            flags: Vec::new(),
        }
    }

    /// Record a flag once
    pub fn flag(&mut self, flag: DiagnosticFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    pub fn has(&self, flag: DiagnosticFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// True when the primary branch was taken and nothing was flagged
    pub fn is_clean(&self) -> bool {
        self.branch == ReconcileBranch::Primary && self.flags.is_empty()
    }
}

/// The single, displayable result of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutcome {
    pub status: OutcomeStatus,
    /// Always `Some` unless `status` is `Failure`
    pub item_count: Option<u64>,
    pub download: Option<DownloadRef>,
    pub message: String,
    pub diagnostic: Diagnostic,
}

impl NormalizedOutcome {
    /// Build a success-shaped outcome
    pub fn succeeded(
        status: OutcomeStatus,
        item_count: u64,
        download: Option<DownloadRef>,
        message: impl Into<String>,
        diagnostic: Diagnostic,
    ) -> Self {
        debug_assert!(status.is_success_shaped());
        Self {
            status,
            item_count: Some(item_count),
            download,
            message: message.into(),
            diagnostic,
        }
    }

    /// Build a failure outcome
    pub fn failed(message: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            item_count: None,
            download: None,
            message: message.into(),
            diagnostic,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failure
    }

    /// Whether a download action may be offered
    pub fn can_download(&self) -> bool {
        self.download.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_recorded_once() {
        let mut diagnostic = Diagnostic::new(ReconcileBranch::Primary);
        assert!(diagnostic.is_clean());

        diagnostic.flag(DiagnosticFlag::ZeroCount);
        diagnostic.flag(DiagnosticFlag::ZeroCount);

        assert_eq!(diagnostic.flags, vec![DiagnosticFlag::ZeroCount]);
        assert!(diagnostic.has(DiagnosticFlag::ZeroCount));
        assert!(!diagnostic.is_clean());
    }

    #[test]
    fn test_fallback_branch_is_never_clean() {
        let diagnostic = Diagnostic::new(ReconcileBranch::ResultMissing);
        assert!(!diagnostic.is_clean());
    }

    #[test]
    fn test_failure_has_no_count() {
        let outcome = NormalizedOutcome::failed(
            "Failed to fetch job progress.",
            Diagnostic::new(ReconcileBranch::PollFailed),
        );
        assert!(outcome.is_failure());
        assert_eq!(outcome.item_count, None);
        assert!(!outcome.can_download());
    }
}
