//! In-process notification bus backed by a tokio broadcast channel

use tokio::sync::broadcast;
use tracing::debug;

use super::ports::{Notification, NotificationBus};

const DEFAULT_CAPACITY: usize = 64;

/// Broadcast-channel implementation of [`NotificationBus`].
///
/// Slow subscribers that fall more than `capacity` messages behind observe
/// `RecvError::Lagged` and should treat it as "something changed".
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastBus {
    /// Bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bus buffering up to `capacity` messages per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus for BroadcastBus {
    fn publish(&self, notification: Notification) {
        let kind = notification.kind;
        match self.sender.send(notification) {
            Ok(receivers) => debug!(%kind, receivers, "notification published"),
            Err(_) => debug!(%kind, "notification dropped, no subscribers"),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
