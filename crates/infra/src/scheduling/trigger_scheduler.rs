//! Trigger scheduler for board reconciliation.
//!
//! Runs `TaskBoard::sync` when:
//! - the session flips to signed in (once, right away)
//! - the repeating interval fires while signed in (default 5 minutes)
//! - another component announces a task or calendar event change
//!
//! The interval only exists while the session is signed in; signing out
//! drops it. Syncs run one at a time inside the loop, so triggers that
//! arrive during a sync are handled after it finishes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use taskboard_infra::scheduling::{TriggerScheduler, TriggerSchedulerConfig};
//!
//! # async fn example(board: Arc<taskboard_core::TaskBoard>) -> Result<(), String> {
//! let mut scheduler = TriggerScheduler::new(board, TriggerSchedulerConfig::default());
//! scheduler.start().await.map_err(|e| e.to_string())?;
//! // ... application runs ...
//! scheduler.stop().await.map_err(|e| e.to_string())?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskboard_core::{BoardError, Notification, TaskBoard};
use taskboard_domain::constants::{DEFAULT_SYNC_INTERVAL_SECS, DEFAULT_SYNC_JOB_TIMEOUT_SECS};
use taskboard_domain::SyncConfig;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the trigger scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSchedulerConfig {
    /// Period of the repeating sync while signed in
    pub interval: Duration,
    /// Upper bound for a single sync
    pub job_timeout: Duration,
}

impl Default for TriggerSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            job_timeout: Duration::from_secs(DEFAULT_SYNC_JOB_TIMEOUT_SECS),
        }
    }
}

impl From<&SyncConfig> for TriggerSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self { interval: config.interval(), job_timeout: config.job_timeout() }
    }
}

/// Why a sync was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    SignedIn,
    Interval,
    Notification,
    /// Notifications were dropped; one sync covers all of them.
    Lagged,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::SignedIn => "signed_in",
            Self::Interval => "interval",
            Self::Notification => "notification",
            Self::Lagged => "lagged",
        }
    }
}

/// Drives reconciliation from the session, a timer and the notification bus
pub struct TriggerScheduler {
    board: Arc<TaskBoard>,
    config: TriggerSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl TriggerScheduler {
    /// Scheduler for `board`; nothing runs until [`start`](Self::start).
    pub fn new(board: Arc<TaskBoard>, config: TriggerSchedulerConfig) -> Self {
        Self {
            board,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &TriggerSchedulerConfig {
        &self.config
    }

    /// Start the scheduler
    ///
    /// If the session is already signed in, the first sync runs right away.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting trigger scheduler"
        );

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        // Subscribe before spawning so nothing published after start is missed
        let session = self.board.session().subscribe();
        let notifications = self.board.bus().subscribe();
        let board = Arc::clone(&self.board);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::trigger_loop(board, config, cancel, session, notifications).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Trigger scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the loop (and a sync in flight) and awaits completion.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running or the loop does not exit
    /// within five seconds
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping trigger scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!("Trigger scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn trigger_loop(
        board: Arc<TaskBoard>,
        config: TriggerSchedulerConfig,
        cancel: CancellationToken,
        mut session: watch::Receiver<bool>,
        notifications: broadcast::Receiver<Notification>,
    ) {
        let mut notifications = Some(notifications);
        let mut ticker = None;

        let signed_in = *session.borrow_and_update();
        if signed_in {
            ticker = Some(arm(config.interval));
            Self::run_sync(&board, &config, &cancel, Trigger::SignedIn).await;
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Trigger loop cancelled");
                    break;
                }
                changed = session.changed() => {
                    if changed.is_err() {
                        debug!("Session channel closed");
                        break;
                    }
                    let signed_in = *session.borrow_and_update();
                    if signed_in {
                        ticker = Some(arm(config.interval));
                        Self::run_sync(&board, &config, &cancel, Trigger::SignedIn).await;
                    } else if ticker.take().is_some() {
                        info!("Signed out, sync timer cancelled");
                    }
                }
                () = next_tick(&mut ticker) => {
                    Self::run_sync(&board, &config, &cancel, Trigger::Interval).await;
                }
                received = next_notification(&mut notifications) => match received {
                    Ok(notification) if notification.triggers_sync() => {
                        debug!(kind = %notification.kind, "Change announced elsewhere");
                        Self::run_sync(&board, &config, &cancel, Trigger::Notification).await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notification bus lagged");
                        Self::run_sync(&board, &config, &cancel, Trigger::Lagged).await;
                    }
                    Err(RecvError::Closed) => {
                        debug!("Notification bus closed");
                        notifications = None;
                    }
                }
            }
        }
    }

    async fn run_sync(
        board: &TaskBoard,
        config: &TriggerSchedulerConfig,
        cancel: &CancellationToken,
        trigger: Trigger,
    ) {
        if !board.is_authenticated() {
            debug!(trigger = trigger.as_str(), "Not signed in, sync skipped");
            return;
        }

        debug!(trigger = trigger.as_str(), "Sync triggered");
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(trigger = trigger.as_str(), "Sync abandoned on shutdown");
            }
            result = tokio::time::timeout(config.job_timeout, board.sync()) => match result {
                Ok(Ok(report)) => info!(
                    trigger = trigger.as_str(),
                    generation = report.generation,
                    todo = report.todo,
                    in_progress = report.in_progress,
                    done = report.done,
                    "Board synced"
                ),
                Ok(Err(BoardError::Superseded)) => {
                    debug!(trigger = trigger.as_str(), "Sync result dropped, session changed");
                }
                Ok(Err(err)) if err.is_auth_expired() => {
                    warn!(trigger = trigger.as_str(), error = %err, "Sync rejected, session ended");
                }
                Ok(Err(err)) => {
                    warn!(trigger = trigger.as_str(), error = %err, "Sync failed, will retry");
                }
                Err(_) => error!(
                    trigger = trigger.as_str(),
                    timeout_secs = config.job_timeout.as_secs(),
                    "Sync timed out"
                ),
            }
        }
    }
}

impl Drop for TriggerScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("TriggerScheduler dropped while running; cancelling background task");
        }
        self.cancellation_token.cancel();
    }
}

/// Interval whose first tick is one full period away.
fn arm(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_notification(
    notifications: &mut Option<broadcast::Receiver<Notification>>,
) -> Result<Notification, RecvError> {
    match notifications {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
