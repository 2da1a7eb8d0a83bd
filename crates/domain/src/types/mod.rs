//! Domain types and models
//!
//! `task` holds the shapes owned by the remote stores; `board` holds the
//! client-side mirror built from them.

pub mod board;
pub mod task;

pub use board::{Board, BoardItem, ColumnId, ItemId, ItemKind, RemoteTransition};
pub use task::{CalendarEvent, NewTask, Task, TaskStatus};
