//! API-specific error types
//!
//! Classifies backend failures so the board can tell a dead session apart
//! from a flaky network.

use std::time::Duration;

use taskboard_domain::TaskboardError;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - the session is gone
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors - non-retryable
    Config,
}

/// Backend API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 or 403
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 429
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// 5xx
    #[error("Server error: {0}")]
    Server(String),

    /// 404
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other 4xx
    #[error("Client error: {0}")]
    Client(String),

    /// Connection, TLS or body decoding failure
    #[error("Network error: {0}")]
    Network(String),

    /// Bad base URL or client setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request did not finish in time
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::NotFound(_) | Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether trying again later can succeed without user action.
    ///
    /// Authentication failures are not retryable here: the session has to be
    /// re-established first.
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }

    /// Map a transport-level domain error coming out of [`HttpClient`].
    ///
    /// [`HttpClient`]: crate::http::HttpClient
    pub(crate) fn from_transport(err: TaskboardError) -> Self {
        match err {
            TaskboardError::Network(message) => Self::Network(message),
            TaskboardError::Auth(message) => Self::Auth(message),
            TaskboardError::Config(message) => Self::Config(message),
            TaskboardError::NotFound(message) => Self::NotFound(message),
            TaskboardError::InvalidInput(message) => Self::Client(message),
            TaskboardError::Storage(message) | TaskboardError::Internal(message) => {
                Self::Server(message)
            }
        }
    }
}

impl From<ApiError> for TaskboardError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Auth(_) => TaskboardError::Auth(message),
            ApiError::NotFound(_) => TaskboardError::NotFound(message),
            ApiError::Client(_) => TaskboardError::InvalidInput(message),
            ApiError::Config(_) => TaskboardError::Config(message),
            ApiError::RateLimit(_)
            | ApiError::Server(_)
            | ApiError::Network(_)
            | ApiError::Timeout(_) => TaskboardError::Network(message),
        }
    }
}
