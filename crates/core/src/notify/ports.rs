//! Notification port

use taskboard_domain::constants::{
    EVENT_CALENDAR_EVENT_ADDED, EVENT_CALENDAR_EVENT_EDITED, EVENT_TASK_ADDED, EVENT_TASK_EDITED,
};
use taskboard_domain::impl_domain_status_conversions;
use tokio::sync::broadcast;

/// What happened elsewhere in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A task was created.
    TaskAdded,
    /// A task was changed.
    TaskEdited,
    /// A calendar event was created.
    CalendarEventAdded,
    /// A calendar event was changed.
    CalendarEventEdited,
}

impl_domain_status_conversions!(NotificationKind {
    TaskAdded => EVENT_TASK_ADDED,
    TaskEdited => EVENT_TASK_EDITED,
    CalendarEventAdded => EVENT_CALENDAR_EVENT_ADDED,
    CalendarEventEdited => EVENT_CALENDAR_EVENT_EDITED,
});

/// Who published the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The board itself.
    Board,
    /// Any other component.
    External,
}

/// Cross-component change notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What happened.
    pub kind: NotificationKind,
    /// Who published it.
    pub origin: Origin,
    /// Remote identifier of the task or event concerned, when known.
    pub subject: Option<String>,
}

impl Notification {
    /// Notice from outside the board.
    pub fn external(kind: NotificationKind) -> Self {
        Self { kind, origin: Origin::External, subject: None }
    }

    /// Notice published by the board about `subject`.
    pub fn from_board(kind: NotificationKind, subject: impl Into<String>) -> Self {
        Self { kind, origin: Origin::Board, subject: Some(subject.into()) }
    }

    /// Whether receiving this notification should trigger a reconciliation.
    pub fn triggers_sync(&self) -> bool {
        self.origin == Origin::External
    }
}

/// Publish/subscribe channel shared by the board and the rest of the app.
pub trait NotificationBus: Send + Sync {
    /// Publish to every current subscriber; having none is not an error.
    fn publish(&self, notification: Notification);

    /// Receive every notification published from now on.
    fn subscribe(&self) -> broadcast::Receiver<Notification>;
}
