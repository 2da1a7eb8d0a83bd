//! Task board facade - ties the engine pieces to the session state

use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_domain::constants::{BOARD_SNAPSHOT_KEY, DEFAULT_TASK_NOTES};
use taskboard_domain::{Board, BoardItem, ColumnId, Config, InProgressPolicy, ItemId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::drag::DragController;
use super::mirror::{Epoch, LocalMirror};
use super::mutation::MutationController;
use super::ports::{CalendarFeed, SnapshotStore, TaskStore};
use super::reconciler::{Reconciler, SyncReport, SyncScope};
use crate::errors::{BoardError, BoardResult};
use crate::notify::{BroadcastBus, NotificationBus};
use crate::session::Session;

/// Engine settings derived from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOptions {
    /// Fetch completed tasks on a full sync.
    pub include_completed: bool,
    /// See [`InProgressPolicy`].
    pub in_progress_policy: InProgressPolicy,
    /// Merge calendar events into `todo`.
    pub include_calendar_events: bool,
    /// Key for the persisted board.
    pub snapshot_key: String,
    /// Notes attached to tasks created from the board.
    pub task_notes: String,
}

impl BoardOptions {
    /// Options from the `sync` and `storage` sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_completed: config.sync.include_completed,
            in_progress_policy: config.sync.in_progress_policy,
            include_calendar_events: config.sync.include_calendar_events,
            snapshot_key: config.storage.snapshot_key.clone(),
            task_notes: DEFAULT_TASK_NOTES.to_string(),
        }
    }
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            include_completed: true,
            in_progress_policy: InProgressPolicy::default(),
            include_calendar_events: false,
            snapshot_key: BOARD_SNAPSHOT_KEY.to_string(),
            task_notes: DEFAULT_TASK_NOTES.to_string(),
        }
    }
}

/// Builder for [`TaskBoard`].
pub struct TaskBoardBuilder {
    tasks: Arc<dyn TaskStore>,
    calendar: Option<Arc<dyn CalendarFeed>>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    bus: Option<Arc<dyn NotificationBus>>,
    options: BoardOptions,
}

impl TaskBoardBuilder {
    /// Read calendar events from `calendar`.
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarFeed>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Persist the board while signed in.
    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Share a bus with the rest of the app instead of a private one.
    pub fn with_bus(mut self, bus: Arc<dyn NotificationBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Replace the default options.
    pub fn with_options(mut self, options: BoardOptions) -> Self {
        self.options = options;
        self
    }

    /// Assemble the board. It starts signed out.
    pub fn build(self) -> TaskBoard {
        let options = self.options;
        let mirror = Arc::new(match self.snapshots {
            Some(store) => LocalMirror::with_persistence(store, options.snapshot_key.clone()),
            None => LocalMirror::new(),
        });
        let bus = self.bus.unwrap_or_else(|| Arc::new(BroadcastBus::new()));

        let scope = if options.include_completed { SyncScope::Full } else { SyncScope::OpenOnly };
        let mut reconciler = Reconciler::new(Arc::clone(&self.tasks), Arc::clone(&mirror))
            .with_policy(options.in_progress_policy)
            .with_scope(scope);
        if options.include_calendar_events {
            if let Some(calendar) = self.calendar {
                reconciler = reconciler.with_calendar(calendar);
            }
        }

        let mutations = MutationController::new(
            self.tasks,
            Arc::clone(&mirror),
            Arc::clone(&bus),
            options.task_notes,
        );

        TaskBoard {
            mirror,
            reconciler,
            mutations,
            drag: DragController::new(),
            session: Session::new(),
            bus,
            transition: Mutex::new(()),
        }
    }
}

/// The task board core.
///
/// Every operation that reaches the remote store funnels its error through
/// one place: `AuthExpired` drops the board to the signed-out state (empty
/// columns, no snapshot, scheduler timer cancelled via the session watch).
pub struct TaskBoard {
    mirror: Arc<LocalMirror>,
    reconciler: Reconciler,
    mutations: MutationController,
    drag: DragController,
    session: Session,
    bus: Arc<dyn NotificationBus>,
    transition: Mutex<()>,
}

impl TaskBoard {
    /// Start building a board on top of `tasks`.
    pub fn builder(tasks: Arc<dyn TaskStore>) -> TaskBoardBuilder {
        TaskBoardBuilder {
            tasks,
            calendar: None,
            snapshots: None,
            bus: None,
            options: BoardOptions::default(),
        }
    }

    /// Current board (cloned).
    pub fn board(&self) -> Board {
        self.mirror.board()
    }

    /// Render hook.
    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.mirror.subscribe()
    }

    /// Authentication state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shorthand for `session().is_authenticated()`.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Bus the board publishes to and listens on.
    pub fn bus(&self) -> Arc<dyn NotificationBus> {
        Arc::clone(&self.bus)
    }

    /// Underlying mirror.
    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    /// Report an authentication change. Returns `true` on a transition.
    ///
    /// Signing in restores the persisted snapshot before the flag flips, so
    /// the sync the scheduler runs on the transition always lands on top of
    /// it. Signing out empties the board and deletes the snapshot.
    pub fn set_authenticated(&self, authenticated: bool) -> bool {
        let _transition = self.transition.lock();
        if self.session.is_authenticated() == authenticated {
            return false;
        }

        if authenticated {
            self.mirror.set_persistence(true);
            self.restore_snapshot();
            return self.session.set(true);
        }

        let changed = self.session.set(false);
        self.mirror.set_persistence(false);
        self.drag.cancel();
        self.mirror.reset();
        self.mirror.forget_persisted();
        changed
    }

    /// Replace the board with the persisted snapshot, if there is one.
    pub fn restore_snapshot(&self) -> bool {
        match self.mirror.load_persisted() {
            Some(board) => {
                info!(items = board.len(), "restored board snapshot");
                self.mirror.replace(board);
                true
            }
            None => false,
        }
    }

    /// Reconcile with the remote store.
    pub async fn sync(&self) -> BoardResult<SyncReport> {
        let epoch = self.ensure_signed_in()?;
        let result = self.reconciler.sync().await;
        self.settle(epoch, result)
    }

    /// Reconcile with an explicit scope.
    pub async fn sync_scope(&self, scope: SyncScope) -> BoardResult<SyncReport> {
        let epoch = self.ensure_signed_in()?;
        let result = self.reconciler.sync_scope(scope).await;
        self.settle(epoch, result)
    }

    /// Manual refresh; same semantics as [`sync`](Self::sync).
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> BoardResult<SyncReport> {
        info!("manual refresh requested");
        self.sync().await
    }

    /// Create a task in `column`.
    pub async fn create(&self, title: &str, column: ColumnId) -> BoardResult<BoardItem> {
        let epoch = self.ensure_signed_in()?;
        let result = self.mutations.create(title, column).await;
        self.settle(epoch, result)
    }

    /// Delete the item in `column`.
    pub async fn delete(&self, column: ColumnId, id: &ItemId) -> BoardResult<()> {
        let epoch = self.ensure_signed_in()?;
        let result = self.mutations.delete(column, id).await;
        self.settle(epoch, result)
    }

    /// Flip the completion state; returns the new column.
    pub async fn toggle_complete(&self, column: ColumnId, id: &ItemId) -> BoardResult<ColumnId> {
        let epoch = self.ensure_signed_in()?;
        let result = self.mutations.toggle_complete(column, id).await;
        self.settle(epoch, result)
    }

    /// Move without a drag gesture (keyboard or programmatic move).
    pub async fn move_item(
        &self,
        source: ColumnId,
        target: ColumnId,
        id: &ItemId,
    ) -> BoardResult<()> {
        let epoch = self.ensure_signed_in()?;
        let result = self.mutations.move_via_drag(source, target, id).await;
        self.settle(epoch, result)
    }

    /// Start a drag of `item` from `source`.
    pub fn begin_drag(&self, item: ItemId, source: ColumnId) -> BoardResult<()> {
        self.mirror.read(|board| self.drag.begin(board, item, source))
    }

    /// Whether dropping here would be accepted.
    pub fn hover(&self, column: ColumnId) -> bool {
        self.drag.hover(column)
    }

    /// Drop the dragged item on `target`. The session ends whether or not
    /// the move succeeds.
    pub async fn drop_on(&self, target: ColumnId) -> BoardResult<()> {
        let session = self.drag.take()?;
        let epoch = self.ensure_signed_in()?;
        let result = self.mutations.move_via_drag(session.source, target, &session.item).await;
        self.settle(epoch, result)
    }

    /// Drop outside any column or explicit cancel.
    pub fn cancel_drag(&self) -> bool {
        self.drag.cancel().is_some()
    }

    /// True while a drag is live.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Epoch the operation runs under, or `AuthExpired` when signed out.
    fn ensure_signed_in(&self) -> BoardResult<Epoch> {
        if self.session.is_authenticated() {
            Ok(self.mirror.epoch())
        } else {
            Err(BoardError::AuthExpired("not signed in".into()))
        }
    }

    /// Sign out on a rejected session, but only if that session is still the
    /// one the operation started under.
    fn settle<T>(&self, epoch: Epoch, result: BoardResult<T>) -> BoardResult<T> {
        if let Err(err) = &result {
            if err.is_auth_expired() && self.session.is_authenticated() {
                if self.mirror.epoch() != epoch {
                    debug!(error = %err, "rejection came from an earlier session, ignoring");
                    return result;
                }
                warn!(error = %err, "session rejected by the task store, signing out");
                self.set_authenticated(false);
            }
        }
        result
    }
}
