//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Board item identity
/// Board ids of remote tasks.
pub const TASK_ITEM_PREFIX: &str = "task-";
/// Board ids of calendar events.
pub const CALENDAR_ITEM_PREFIX: &str = "cal-";
/// Board ids of items whose create is still in flight.
pub const PENDING_ITEM_PREFIX: &str = "local-";

// Remote task defaults
/// Task list used when none is configured.
pub const DEFAULT_TASK_LIST_ID: &str = "@default";
/// Notes attached to tasks created from the board.
pub const DEFAULT_TASK_NOTES: &str = "Added via Kanban Board";

// Local snapshot
/// Default snapshot key.
pub const BOARD_SNAPSHOT_KEY: &str = "kanban_board_data";

// Scheduling
/// Background sync every five minutes.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 5 * 60;
/// A single sync is abandoned after a minute.
pub const DEFAULT_SYNC_JOB_TIMEOUT_SECS: u64 = 60;

// Remote API
/// Local backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
/// Request timeout.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

// Rendering
/// Titles are cut to this many characters.
pub const MAX_TITLE_LENGTH: usize = 80;
/// Appended to a truncated title.
pub const TITLE_TRUNCATE_SUFFIX: &str = "...";

// Cross-component notification names
/// A task was created.
pub const EVENT_TASK_ADDED: &str = "kanban-task-added";
/// A calendar event was created.
pub const EVENT_CALENDAR_EVENT_ADDED: &str = "kanban-event-added";
/// A task was edited.
pub const EVENT_TASK_EDITED: &str = "kanban-task-edited";
/// A calendar event was edited.
pub const EVENT_CALENDAR_EVENT_EDITED: &str = "kanban-event-edited";
