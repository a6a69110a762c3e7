//! Session identifier issued by the scrape server

use serde::{Deserialize, Serialize};

/// Opaque identifier of one server-side scrape job
///
/// The server hands this out when a job starts. The client never inspects it,
/// it only echoes it back in progress requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a server-issued identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_transparent_on_the_wire() {
        let id = SessionId::new("1718000000000");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1718000000000\"");

        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "1718000000000");
    }
}
