//! Task board engine
//!
//! - [`LocalMirror`]: the board everything renders from
//! - [`Reconciler`]: full refresh from the remote store
//! - [`MutationController`]: optimistic create/delete/toggle/move
//! - [`DragController`]: the drag gesture state machine
//! - [`TaskBoard`]: facade wiring the above to the session

pub mod drag;
pub mod mirror;
pub mod mutation;
pub mod ports;
pub mod reconciler;
pub mod service;

pub use drag::{DragController, DragSession, DragState};
pub use mirror::{Epoch, LocalMirror};
pub use mutation::MutationController;
pub use reconciler::{classify, Reconciler, SyncReport, SyncScope};
pub use service::{BoardOptions, TaskBoard, TaskBoardBuilder};
