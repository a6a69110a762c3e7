//! Progress snapshot domain types
//!
//! A snapshot is what one `GET /api/progress/{session_id}` returns. The server
//! is loose about the shape of the terminal snapshot, so counts are kept as raw
//! JSON values and coerced later by the reconciler.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One poll result for a running or finished job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completion percentage, expected 0-100 but not enforced by the server
    #[serde(default)]
    pub percentage: i64,

    /// Human-readable phase label
    #[serde(default)]
    pub status: String,

    /// Human-readable sub-step label, may be empty
    #[serde(default)]
    pub current_action: String,

    /// Terminal flag
    #[serde(default)]
    pub completed: bool,

    /// Steps done so far, when the server reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,

    /// Total number of steps, when the server reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Secondary item count, used only as a reconciliation fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_count: Option<JsonValue>,

    /// Nested outcome, normally present only once `completed` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultPayload>,
}

impl ProgressSnapshot {
    /// Percentage clamped into the displayable 0-100 range
    pub fn clamped_percentage(&self) -> u8 {
        self.percentage.clamp(0, 100) as u8
    }

    /// Whether this snapshot ends polling
    pub fn is_terminal(&self) -> bool {
        self.completed
    }
}

/// Outcome payload nested in a terminal snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_count: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
