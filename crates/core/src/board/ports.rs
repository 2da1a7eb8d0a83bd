//! Board port interfaces
//!
//! These traits define the boundaries between the board engine and the
//! outside world. Infrastructure adapters live in `taskboard-infra`.

use async_trait::async_trait;
use taskboard_domain::{Board, CalendarEvent, NewTask, Result, Task};

/// Remote task collection (the authoritative source).
///
/// Every call requires an active session and fails with
/// [`TaskboardError::Auth`](taskboard_domain::TaskboardError::Auth) when the
/// session is no longer valid.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// List tasks, optionally including completed ones
    async fn list_tasks(&self, include_completed: bool) -> Result<Vec<Task>>;

    /// Create a task and return it with its remote identifier
    async fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Mark a task completed
    async fn complete_task(&self, id: &str) -> Result<()>;

    /// Reopen a completed task
    async fn uncomplete_task(&self, id: &str) -> Result<()>;

    /// Delete a task; one that is already gone counts as deleted
    async fn delete_task(&self, id: &str) -> Result<()>;
}

/// Read-only feed of upcoming calendar events shown on the board.
#[async_trait]
pub trait CalendarFeed: Send + Sync {
    /// Events to show, soonest first.
    async fn list_events(&self) -> Result<Vec<CalendarEvent>>;
}

/// Durable local storage for a single board snapshot per key.
///
/// Calls are synchronous; implementations are expected to be fast local
/// writes.
pub trait SnapshotStore: Send + Sync {
    /// Stored board, if any.
    fn load(&self, key: &str) -> Result<Option<Board>>;

    /// Overwrite the board stored under `key`.
    fn save(&self, key: &str, board: &Board) -> Result<()>;

    /// Forget `key`; a missing key is not an error.
    fn clear(&self, key: &str) -> Result<()>;
}
