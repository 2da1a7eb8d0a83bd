//! REST backend client
//!
//! Thin JSON layer over [`HttpClient`]: attaches the bearer session id,
//! enforces a per-call timeout and turns HTTP status codes into [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use taskboard_domain::constants::{DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS};
use taskboard_domain::ApiConfig;
use tracing::{debug, instrument};
use url::Url;

use super::auth::SessionTokenProvider;
use super::errors::ApiError;
use crate::http::HttpClient;

/// Configuration for [`BackendClient`]
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g. `http://localhost:8000`)
    pub base_url: String,
    /// Timeout for a single API call, retries included
    pub timeout: Duration,
    /// Total attempts for idempotent requests
    pub max_attempts: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            max_attempts: 3,
        }
    }
}

impl From<&ApiConfig> for BackendConfig {
    fn from(config: &ApiConfig) -> Self {
        Self { base_url: config.base_url.clone(), timeout: config.timeout(), ..Self::default() }
    }
}

/// JSON client for the backend's REST API
pub struct BackendClient {
    http: HttpClient,
    auth: Arc<dyn SessionTokenProvider>,
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is not an absolute http(s)
    /// URL or the HTTP client cannot be built.
    pub fn new(
        config: BackendConfig,
        auth: Arc<dyn SessionTokenProvider>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL {}: {e}", config.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported URL scheme {} in {}",
                parsed.scheme(),
                config.base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self {
            http,
            auth,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, path, &[], None).await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, path, query, None).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    /// Execute a PUT request without a body
    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        self.execute::<(), R>(Method::PUT, path, query, None).await
    }

    /// Execute a DELETE request
    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        self.execute::<(), R>(Method::DELETE, path, query, None).await
    }

    #[instrument(skip_all, fields(%method, path = %path))]
    async fn execute<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "backend request");

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json")
            .query(query);
        if let Some(token) = self.auth.session_token().await? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match tokio::time::timeout(self.timeout, self.http.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(ApiError::from_transport(err)),
            Err(_) => return Err(ApiError::Timeout(self.timeout)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status_error(status, &url, body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;

        // 204/205 and empty 200 bodies decode as JSON null
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || bytes.iter().all(u8::is_ascii_whitespace)
        {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                ApiError::Client(format!(
                    "Empty response ({}), but response type cannot be deserialized from it",
                    status.as_u16()
                ))
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Client(format!("Failed to parse response from {url}: {e}")))
    }

    fn map_status_error(status: StatusCode, url: &str, body: String) -> ApiError {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Auth(message)
        } else if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            ApiError::RateLimit(message)
        } else if status.is_server_error() {
            ApiError::Server(message)
        } else if status.is_client_error() {
            ApiError::Client(message)
        } else {
            ApiError::Network(message)
        }
    }
}
