//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use taskboard_domain::TaskboardError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TaskboardError);

impl From<InfraError> for TaskboardError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TaskboardError> for InfraError {
    fn from(value: TaskboardError) -> Self {
        InfraError(value)
    }
}

trait IntoTaskboardError {
    fn into_taskboard(self) -> TaskboardError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TaskboardError */
/* -------------------------------------------------------------------------- */

impl IntoTaskboardError for SqlError {
    fn into_taskboard(self) -> TaskboardError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => TaskboardError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        TaskboardError::Storage("database is locked".into())
                    }
                    ErrorCode::ReadOnly => {
                        TaskboardError::Storage("database is read-only".into())
                    }
                    ErrorCode::CannotOpen => {
                        TaskboardError::Storage(format!("unable to open database: {message}"))
                    }
                    _ => TaskboardError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TaskboardError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TaskboardError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TaskboardError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => TaskboardError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => TaskboardError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_taskboard())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TaskboardError */
/* -------------------------------------------------------------------------- */

impl IntoTaskboardError for HttpError {
    fn into_taskboard(self) -> TaskboardError {
        if self.is_timeout() {
            return TaskboardError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TaskboardError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return TaskboardError::Internal(format!("failed to decode HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => TaskboardError::Auth(message),
                404 => TaskboardError::NotFound(message),
                400..=499 if code != 429 => TaskboardError::InvalidInput(message),
                _ => TaskboardError::Network(message),
            };
        }

        TaskboardError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_taskboard())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn status_error(status: StatusCode) -> HttpError {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(status)).mount(&server).await;

        let client = Client::builder().no_proxy().build().unwrap();
        client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err()
    }

    #[test]
    fn sqlite_busy_maps_to_storage_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: TaskboardError = InfraError::from(err).into();
        match mapped {
            TaskboardError::Storage(msg) => assert!(msg.contains("busy")),
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: TaskboardError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, TaskboardError::NotFound(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let mapped: TaskboardError =
            InfraError::from(status_error(StatusCode::UNAUTHORIZED).await).into();

        match mapped {
            TaskboardError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_status_429_stays_retryable() {
        let mapped: TaskboardError =
            InfraError::from(status_error(StatusCode::TOO_MANY_REQUESTS).await).into();

        assert!(matches!(mapped, TaskboardError::Network(_)));
    }
}
