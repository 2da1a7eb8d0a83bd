//! Remote task and calendar event shapes

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Status of a task as the remote store knows it.
///
/// The remote model is two-state. Any status string other than `completed`
/// is treated as still open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Open.
    #[default]
    NeedsAction,
    /// Done.
    Completed,
}

impl_domain_status_conversions!(TaskStatus {
    NeedsAction => "needsAction",
    Completed => "completed",
});

impl TaskStatus {
    /// Classify a raw remote status string.
    pub fn from_remote(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::NeedsAction
        }
    }

    /// True for [`TaskStatus::Completed`].
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Task as mirrored from the remote task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Remote identifier.
    pub id: String,
    /// Title as stored remotely.
    pub title: String,
    /// Notes, empty when absent.
    #[serde(default)]
    pub notes: String,
    /// Completion state.
    #[serde(default)]
    pub status: TaskStatus,
}

/// Payload for creating a task remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Title as entered, already validated.
    pub title: String,
    /// Notes stored with the task.
    pub notes: String,
    /// Initial status; the backend defaults to open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl NewTask {
    /// Open task with `title` and `notes`.
    pub fn new(title: impl Into<String>, notes: impl Into<String>) -> Self {
        Self { title: title.into(), notes: notes.into(), status: None }
    }
}

/// Upcoming calendar event shown on the board as a read-only item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event identifier at the calendar provider.
    pub id: String,
    /// Title shown on the board.
    pub summary: String,
}
