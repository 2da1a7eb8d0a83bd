//! Local mirror of the remote task collection
//!
//! The single in-memory [`Board`] everything renders from. All operations are
//! synchronous: they take the lock, change the board and publish the new
//! board to render subscribers. While persistence is enabled a snapshot is
//! written once the lock is released; a snapshot older than the last one
//! written is skipped. Persistence failures are logged and never returned.
//!
//! Two counters live next to the board:
//! - `revision` increases on every commit, so a mutation can tell whether
//!   anything else committed since it applied its optimistic change.
//! - `epoch` increases when the session ends. Work started under an older
//!   epoch (a sync or mutation still waiting on the network) is discarded
//!   instead of repopulating a signed-out board.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_domain::{Board, BoardItem, ColumnId, ItemId};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::ports::SnapshotStore;

/// Ticket identifying the session a piece of work started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

/// Result of [`LocalMirror::apply`].
pub(crate) struct Applied<R> {
    pub value: R,
    pub snapshot: Board,
    pub revision: u64,
    pub epoch: Epoch,
}

#[derive(Debug, Default)]
struct MirrorState {
    board: Board,
    revision: u64,
    epoch: u64,
}

struct Persistence {
    store: Arc<dyn SnapshotStore>,
    key: String,
    /// Revision of the newest board handed to the store.
    written: Mutex<u64>,
}

/// Board captured under the lock, saved after it is released.
struct PendingSnapshot {
    board: Board,
    revision: u64,
}

/// Owner of the board.
pub struct LocalMirror {
    state: Mutex<MirrorState>,
    render: watch::Sender<Board>,
    persistence: Option<Persistence>,
    persist_enabled: AtomicBool,
}

impl LocalMirror {
    /// In-memory mirror without snapshot persistence.
    pub fn new() -> Self {
        let (render, _) = watch::channel(Board::default());
        Self {
            state: Mutex::new(MirrorState::default()),
            render,
            persistence: None,
            persist_enabled: AtomicBool::new(false),
        }
    }

    /// Mirror that writes a snapshot under `key` after each commit while
    /// persistence is enabled.
    pub fn with_persistence(store: Arc<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        let persistence = Persistence { store, key: key.into(), written: Mutex::new(0) };
        Self { persistence: Some(persistence), ..Self::new() }
    }

    /// Current board (cloned).
    pub fn board(&self) -> Board {
        self.state.lock().board.clone()
    }

    /// Inspect the board without committing anything.
    pub fn read<R>(&self, inspect: impl FnOnce(&Board) -> R) -> R {
        inspect(&self.state.lock().board)
    }

    /// Number of commits so far.
    pub fn revision(&self) -> u64 {
        self.state.lock().revision
    }

    /// Ticket for the current session.
    pub fn epoch(&self) -> Epoch {
        Epoch(self.state.lock().epoch)
    }

    /// Render hook: receives the board after every commit.
    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.render.subscribe()
    }

    /// Snapshot writes only happen while signed in.
    pub fn set_persistence(&self, enabled: bool) {
        self.persist_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Atomically swap in a whole new board.
    pub fn replace(&self, board: Board) {
        self.commit(|current| {
            *current = board;
            Some(())
        });
    }

    /// Append `item` to `column`; `false` if its id is already on the board.
    pub fn insert(&self, column: ColumnId, item: BoardItem) -> bool {
        self.commit(|board| board.insert(column, item).then_some(())).is_some()
    }

    /// Take `id` out of `column`.
    pub fn remove(&self, column: ColumnId, id: &ItemId) -> Option<BoardItem> {
        self.commit(|board| board.remove(column, id))
    }

    /// Move `id` from one column to the end of another.
    pub fn move_item(&self, from: ColumnId, to: ColumnId, id: &ItemId) -> bool {
        if from == to {
            return self.state.lock().board.get(from, id).is_some();
        }
        self.commit(|board| board.move_item(from, to, id).then_some(())).is_some()
    }

    /// Apply an arbitrary change. Nothing is published when `change` returns
    /// `None`.
    pub fn update<R>(&self, change: impl FnOnce(&mut Board) -> Option<R>) -> Option<R> {
        self.commit(change)
    }

    /// Like [`update`](Self::update) but only while the session that started
    /// the work is still current.
    pub fn update_in<R>(
        &self,
        epoch: Epoch,
        change: impl FnOnce(&mut Board) -> Option<R>,
    ) -> Option<R> {
        self.commit_if(|state| state.epoch == epoch.0, change).map(|(value, _)| value)
    }

    /// Apply an optimistic change, capturing the board as it was right
    /// before the change.
    pub(crate) fn apply<R>(
        &self,
        change: impl FnOnce(&mut Board) -> Option<R>,
    ) -> Option<Applied<R>> {
        let mut state = self.state.lock();
        let snapshot = state.board.clone();
        let value = change(&mut state.board)?;
        state.revision += 1;
        let pending = self.publish(&state);
        let applied =
            Applied { value, snapshot, revision: state.revision, epoch: Epoch(state.epoch) };
        drop(state);

        self.persist(pending);
        Some(applied)
    }

    /// Undo an optimistic change.
    ///
    /// When `revision` is still the latest commit the pre-change `snapshot`
    /// is restored verbatim; otherwise `inverse` is applied to the current
    /// board so interleaved commits survive. Returns whether the snapshot was
    /// used.
    pub(crate) fn rollback(
        &self,
        epoch: Epoch,
        revision: u64,
        snapshot: Board,
        inverse: impl FnOnce(&mut Board),
    ) -> bool {
        let mut state = self.state.lock();
        if state.epoch != epoch.0 {
            return false;
        }
        let restored = state.revision == revision;
        if restored {
            state.board = snapshot;
        } else {
            inverse(&mut state.board);
        }
        state.revision += 1;
        let pending = self.publish(&state);
        drop(state);

        self.persist(pending);
        restored
    }

    /// Empty the board and start a new epoch.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.revision += 1;
        state.board.clear();
        let pending = self.publish(&state);
        let epoch = state.epoch;
        drop(state);

        self.persist(pending);
        debug!(epoch, "board reset");
    }

    /// Empty every column without ending the session.
    pub fn clear(&self) {
        self.commit(|board| {
            board.clear();
            Some(())
        });
    }

    /// Read the persisted snapshot, ignoring anything that is not a
    /// well-formed board.
    pub fn load_persisted(&self) -> Option<Board> {
        let persistence = self.persistence.as_ref()?;
        match persistence.store.load(&persistence.key) {
            Ok(Some(board)) if board.is_well_formed() => Some(board),
            Ok(Some(_)) => {
                warn!(key = %persistence.key, "ignoring malformed board snapshot");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key = %persistence.key, error = %err, "failed to load board snapshot");
                None
            }
        }
    }

    /// Delete the persisted snapshot.
    pub fn forget_persisted(&self) {
        if let Some(persistence) = &self.persistence {
            // Held so a save still in flight cannot land after the clear.
            let _written = persistence.written.lock();
            if let Err(err) = persistence.store.clear(&persistence.key) {
                warn!(key = %persistence.key, error = %err, "failed to clear board snapshot");
            }
        }
    }

    fn commit<R>(&self, change: impl FnOnce(&mut Board) -> Option<R>) -> Option<R> {
        self.commit_if(|_| true, change).map(|(value, _)| value)
    }

    fn commit_if<R>(
        &self,
        guard: impl FnOnce(&MirrorState) -> bool,
        change: impl FnOnce(&mut Board) -> Option<R>,
    ) -> Option<(R, u64)> {
        let mut state = self.state.lock();
        if !guard(&state) {
            return None;
        }
        let value = change(&mut state.board)?;
        state.revision += 1;
        let pending = self.publish(&state);
        let revision = state.revision;
        drop(state);

        self.persist(pending);
        Some((value, revision))
    }

    /// Send the board to render subscribers (under the lock, so renders are
    /// never out of order) and capture it for the snapshot writer.
    fn publish(&self, state: &MirrorState) -> Option<PendingSnapshot> {
        self.render.send_replace(state.board.clone());
        if self.persistence.is_none() || !self.persist_enabled.load(Ordering::SeqCst) {
            return None;
        }
        Some(PendingSnapshot { board: state.board.clone(), revision: state.revision })
    }

    /// Save a captured board. Runs without the board lock held.
    fn persist(&self, pending: Option<PendingSnapshot>) {
        let (Some(persistence), Some(pending)) = (&self.persistence, pending) else {
            return;
        };
        let mut written = persistence.written.lock();
        if pending.revision <= *written || !self.persist_enabled.load(Ordering::SeqCst) {
            return;
        }
        *written = pending.revision;
        if let Err(err) = persistence.store.save(&persistence.key, &pending.board) {
            warn!(key = %persistence.key, error = %err, "failed to persist board snapshot");
        }
    }
}

impl Default for LocalMirror {
    fn default() -> Self {
        Self::new()
    }
}
