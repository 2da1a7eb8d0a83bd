//! Scheduling infrastructure for board reconciliation
//!
//! The trigger scheduler owns the only timer in the system and the only
//! subscription to the notification bus:
//! - Explicit lifecycle management (start/stop)
//! - Join handle for the spawned loop
//! - Cancellation token support
//! - Timeout wrapping on every sync

pub mod error;
pub mod trigger_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use trigger_scheduler::{TriggerScheduler, TriggerSchedulerConfig};
