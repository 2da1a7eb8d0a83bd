//! # Taskboard Core
//!
//! Board engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the remote task store, calendar feed,
//!   snapshot storage and the cross-component notification bus
//! - The local mirror, reconciliation engine, mutation controller and drag
//!   session
//! - The `TaskBoard` facade tying them to the session state
//!
//! ## Architecture Principles
//! - Only depends on `taskboard-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - The board lock is never held across an `.await`

pub mod board;
pub mod errors;
pub mod notify;
pub mod session;

// Re-export specific items to avoid ambiguity
pub use board::ports::{CalendarFeed, SnapshotStore, TaskStore};
pub use board::{
    BoardOptions, DragController, DragSession, DragState, LocalMirror, MutationController,
    Reconciler, SyncReport, SyncScope, TaskBoard, TaskBoardBuilder,
};
pub use errors::{BoardError, BoardResult};
pub use notify::{BroadcastBus, Notification, NotificationBus, NotificationKind, Origin};
pub use session::Session;
