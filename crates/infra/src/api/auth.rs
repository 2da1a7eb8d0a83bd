//! Session authentication for the backend
//!
//! The backend hands out an opaque session id after its OAuth redirect flow;
//! every request carries it as a bearer token. Running that flow is the
//! browser's job, so this module only stores the id and asks the backend
//! whether it is still good.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::client::BackendClient;
use super::errors::ApiError;

/// Source of the bearer session id.
///
/// `None` means no session: requests go out without an `Authorization`
/// header and the backend answers 401.
#[async_trait]
pub trait SessionTokenProvider: Send + Sync {
    /// Current session id, if any.
    async fn session_token(&self) -> Result<Option<String>, ApiError>;
}

/// Session id held in memory (from config or environment).
#[derive(Debug, Default)]
pub struct StaticSessionToken {
    token: RwLock<Option<String>>,
}

impl StaticSessionToken {
    /// Holder for `token`; blank tokens count as none.
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|value| !value.trim().is_empty());
        Self { token: RwLock::new(token) }
    }

    /// Replace the session id.
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Forget the session id. Returns whether one was held.
    pub fn clear(&self) -> bool {
        self.token.write().take().is_some()
    }

    /// True while a session id is held.
    pub fn is_present(&self) -> bool {
        self.token.read().is_some()
    }
}

#[async_trait]
impl SessionTokenProvider for StaticSessionToken {
    async fn session_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.token.read().clone())
    }
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    #[serde(default)]
    authenticated: bool,
}

/// Ask the backend whether the current session is signed in.
///
/// A 401/403 answer counts as "not signed in" rather than an error.
#[instrument(skip(client))]
pub async fn auth_status(client: &BackendClient) -> Result<bool, ApiError> {
    match client.get::<AuthStatus>("/auth/status").await {
        Ok(status) => {
            debug!(authenticated = status.authenticated, "auth status checked");
            Ok(status.authenticated)
        }
        Err(ApiError::Auth(message)) => {
            debug!(%message, "auth status rejected the session");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
