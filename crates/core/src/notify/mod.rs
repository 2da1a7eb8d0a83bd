//! Cross-component notifications
//!
//! Other parts of the application announce that they created or edited a
//! task or calendar event; the board announces the tasks it creates. The bus
//! is injected rather than ambient so tests can observe both directions.

pub mod broadcast;
pub mod ports;

pub use broadcast::BroadcastBus;
pub use ports::{Notification, NotificationBus, NotificationKind, Origin};
