//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Taskboard
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TaskboardError {
    /// Snapshot store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend unreachable, timed out or answered 5xx.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote store rejected the session (401/403).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The remote resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected before reaching the remote store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    /// True when the error means the session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Taskboard operations
pub type Result<T> = std::result::Result<T, TaskboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auth_is_unauthorized() {
        assert!(TaskboardError::Auth("expired".into()).is_unauthorized());
        assert!(!TaskboardError::Network("reset".into()).is_unauthorized());
        assert!(!TaskboardError::NotFound("task".into()).is_unauthorized());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(TaskboardError::Network("down".into())).unwrap();
        assert_eq!(json["type"], "Network");
        assert_eq!(json["message"], "down");
    }
}
