//! Authentication state shared by the board and the trigger scheduler

use tokio::sync::watch;
use tracing::info;

/// Signed-in flag with change notification.
///
/// The scheduler watches this to start and cancel its interval timer.
#[derive(Debug)]
pub struct Session {
    authenticated: watch::Sender<bool>,
}

impl Session {
    /// Starts signed out.
    pub fn new() -> Self {
        let (authenticated, _) = watch::channel(false);
        Self { authenticated }
    }

    /// Current flag.
    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Watch sign-in transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// Set the flag, returning `true` only on an actual transition.
    pub fn set(&self, authenticated: bool) -> bool {
        let changed = self.authenticated.send_if_modified(|current| {
            if *current == authenticated {
                false
            } else {
                *current = authenticated;
                true
            }
        });
        if changed {
            info!(authenticated, "session state changed");
        }
        changed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
