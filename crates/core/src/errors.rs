//! Board engine error taxonomy

use taskboard_domain::{ColumnId, ItemId, TaskboardError};
use thiserror::Error;

/// Outcome of a failed board operation.
///
/// Every variant except `Validation`, `NotFound` and the drag variants means
/// the remote store was contacted. Mutations that fail with `Transient` or
/// `AuthExpired` have already been rolled back when the error is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Rejected locally, nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The session is no longer valid; the board has dropped to signed out.
    #[error("Session expired: {0}")]
    AuthExpired(String),

    /// A mutation failed remotely; retrying may work.
    #[error("Remote call failed: {0}")]
    Transient(#[source] TaskboardError),

    /// A sync failed; the board is unchanged.
    #[error("Sync failed: {0}")]
    SyncFailure(#[source] TaskboardError),

    /// The task exists remotely but the follow-up "mark complete" failed.
    #[error("Task {task_id} was created but could not be marked complete: {source}")]
    PartialCreate {
        /// Remote id of the created task.
        task_id: String,
        /// Why the completion failed.
        source: TaskboardError,
    },

    /// The item is not in the named column.
    #[error("Item {item} not found in column {column}")]
    NotFound {
        /// Item that was asked for.
        item: ItemId,
        /// Column it was expected in.
        column: ColumnId,
    },

    /// The session changed while the operation was waiting on the network;
    /// its result was dropped.
    #[error("Session changed before the result arrived; result discarded")]
    Superseded,

    /// Pointer-down while another drag is live.
    #[error("A drag is already in progress")]
    DragInProgress,

    /// Drop or cancel with nothing being dragged.
    #[error("No drag in progress")]
    NoActiveDrag,
}

impl BoardError {
    /// Classify a failed remote call made by a mutation.
    pub fn from_remote(err: TaskboardError) -> Self {
        match err {
            TaskboardError::Auth(message) => Self::AuthExpired(message),
            other => Self::Transient(other),
        }
    }

    /// Classify a failed remote call made by a reconciliation.
    pub fn from_sync(err: TaskboardError) -> Self {
        match err {
            TaskboardError::Auth(message) => Self::AuthExpired(message),
            other => Self::SyncFailure(other),
        }
    }

    /// True for [`BoardError::AuthExpired`].
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// True when retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::SyncFailure(_) | Self::PartialCreate { .. })
    }
}

/// Result alias for board operations.
pub type BoardResult<T> = std::result::Result<T, BoardError>;
