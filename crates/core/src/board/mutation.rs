//! Mutation controller
//!
//! Each user action runs in three phases: apply the change to the mirror,
//! issue the remote call, then commit or roll back. The mirror is render-able
//! at every suspension point; a failed remote call leaves the board as it was
//! before the action (or, when other commits interleaved, with just this
//! action undone).

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_domain::{
    normalize_title, Board, BoardItem, ColumnId, ItemId, NewTask, RemoteTransition, TaskStatus,
    TaskboardError,
};
use tracing::{debug, info, instrument, warn};

use super::mirror::{Epoch, LocalMirror};
use super::ports::TaskStore;
use crate::errors::{BoardError, BoardResult};
use crate::notify::{Notification, NotificationBus, NotificationKind};

/// An applied optimistic change awaiting its remote outcome.
#[must_use = "an optimistic change must be committed or rolled back"]
struct Optimistic<'a> {
    mirror: &'a LocalMirror,
    label: &'static str,
    snapshot: Board,
    revision: u64,
    epoch: Epoch,
}

impl<'a> Optimistic<'a> {
    /// Apply `change`; `None` when it did not apply.
    fn apply<R>(
        mirror: &'a LocalMirror,
        label: &'static str,
        change: impl FnOnce(&mut Board) -> Option<R>,
    ) -> Option<(Self, R)> {
        let applied = mirror.apply(change)?;
        debug!(label, revision = applied.revision, "optimistic change applied");
        let guard = Self {
            mirror,
            label,
            snapshot: applied.snapshot,
            revision: applied.revision,
            epoch: applied.epoch,
        };
        Some((guard, applied.value))
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn commit(self) {
        debug!(label = self.label, "mutation committed");
    }

    fn rollback(self, inverse: impl FnOnce(&mut Board)) {
        let restored = self.mirror.rollback(self.epoch, self.revision, self.snapshot, inverse);
        warn!(label = self.label, restored_snapshot = restored, "mutation rolled back");
    }
}

/// Applies single user actions optimistically.
pub struct MutationController {
    tasks: Arc<dyn TaskStore>,
    mirror: Arc<LocalMirror>,
    bus: Arc<dyn NotificationBus>,
    notes: String,
    /// Pending items deleted while their create was in flight.
    tombstones: Mutex<HashSet<ItemId>>,
}

impl MutationController {
    /// Controller writing to `tasks` and committing through `mirror`.
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        mirror: Arc<LocalMirror>,
        bus: Arc<dyn NotificationBus>,
        notes: impl Into<String>,
    ) -> Self {
        Self { tasks, mirror, bus, notes: notes.into(), tombstones: Mutex::new(HashSet::new()) }
    }

    /// Create a task in `target`.
    ///
    /// A pending item is shown immediately and promoted once the store
    /// returns the task. Creating into `done` takes a second remote call to
    /// mark the task complete; if that one fails the task stays in `todo` and
    /// [`BoardError::PartialCreate`] is returned.
    #[instrument(skip_all, fields(column = %target))]
    pub async fn create(&self, title: &str, target: ColumnId) -> BoardResult<BoardItem> {
        let Some(title) = normalize_title(title) else {
            return Err(BoardError::Validation("task title must not be empty".into()));
        };

        let pending = BoardItem::pending(title.clone(), self.notes.clone());
        let pending_id = pending.id.clone();
        let Some((guard, ())) = Optimistic::apply(&self.mirror, "create", |board| {
            board.insert(target, pending).then_some(())
        }) else {
            return Err(BoardError::Validation(format!("item {pending_id} already on the board")));
        };
        let epoch = guard.epoch();

        let created = match self.tasks.create_task(NewTask::new(title, self.notes.clone())).await {
            Ok(task) => task,
            Err(err) => {
                guard.rollback(|board| {
                    board.remove_anywhere(&pending_id);
                });
                self.tombstones.lock().remove(&pending_id);
                return Err(BoardError::from_remote(err));
            }
        };
        guard.commit();

        let remote_id = created.id.clone();
        info!(task_id = %remote_id, "task created");
        self.bus.publish(Notification::from_board(NotificationKind::TaskAdded, remote_id.clone()));

        let mut confirmed = BoardItem::from_task(created);

        if self.tombstones.lock().remove(&pending_id) {
            info!(task_id = %remote_id, "item deleted while being created, deleting remote task");
            if let Err(err) = self.tasks.delete_task(&remote_id).await {
                warn!(task_id = %remote_id, error = %err, "follow-up delete failed");
            }
            return Ok(confirmed);
        }

        let promoted = self.mirror.update_in(epoch, |board| {
            promote(board, &pending_id, confirmed.clone(), target)
        });
        let Some(column) = promoted else {
            debug!(task_id = %remote_id, "session ended before the created task was shown");
            return Ok(confirmed);
        };
        if column != ColumnId::Done {
            return Ok(confirmed);
        }

        match self.tasks.complete_task(&remote_id).await {
            Ok(()) => {
                self.mirror.update_in(epoch, |board| {
                    set_status(board, &confirmed.id, TaskStatus::Completed)
                });
                confirmed.status = TaskStatus::Completed;
                Ok(confirmed)
            }
            Err(err) => {
                let id = confirmed.id.clone();
                self.mirror.update_in(epoch, |board| {
                    board.move_item(ColumnId::Done, ColumnId::Todo, &id);
                    set_status(board, &id, TaskStatus::NeedsAction)
                });
                warn!(task_id = %remote_id, error = %err, "created task could not be completed");
                match err {
                    TaskboardError::Auth(message) => Err(BoardError::AuthExpired(message)),
                    source => Err(BoardError::PartialCreate { task_id: remote_id, source }),
                }
            }
        }
    }

    /// Remove an item; tasks known to the store are deleted remotely.
    ///
    /// On failure the item goes back into `column`.
    #[instrument(skip_all, fields(item = %id, column = %column))]
    pub async fn delete(&self, column: ColumnId, id: &ItemId) -> BoardResult<()> {
        let Some((guard, removed)) =
            Optimistic::apply(&self.mirror, "delete", |board| board.remove(column, id))
        else {
            return Err(BoardError::NotFound { item: id.clone(), column });
        };

        let Some(task_id) = removed.task_id().map(str::to_owned) else {
            if removed.is_pending() {
                self.tombstones.lock().insert(id.clone());
            }
            guard.commit();
            return Ok(());
        };

        match self.tasks.delete_task(&task_id).await {
            Ok(()) => {
                guard.commit();
                Ok(())
            }
            Err(TaskboardError::NotFound(_)) => {
                debug!(%task_id, "task already gone remotely");
                guard.commit();
                Ok(())
            }
            Err(err) => {
                guard.rollback(move |board| {
                    board.insert(column, removed);
                });
                Err(BoardError::from_remote(err))
            }
        }
    }

    /// Move an item into `done`, or out of `done` back to `todo`.
    ///
    /// Returns the column the item ended up in.
    #[instrument(skip_all, fields(item = %id, column = %column))]
    pub async fn toggle_complete(&self, column: ColumnId, id: &ItemId) -> BoardResult<ColumnId> {
        let item = self.find(column, id)?;
        if item.is_pending() {
            return Err(BoardError::Validation("task is still being created".into()));
        }

        let target = if column == ColumnId::Done { ColumnId::Todo } else { ColumnId::Done };
        let status = target.remote_status();
        let Some((guard, previous)) = Optimistic::apply(&self.mirror, "toggle", |board| {
            relocate(board, column, target, id, status)
        }) else {
            return Err(BoardError::NotFound { item: id.clone(), column });
        };

        let Some(task_id) = item.task_id() else {
            guard.commit();
            return Ok(target);
        };

        let result = if target == ColumnId::Done {
            self.tasks.complete_task(task_id).await
        } else {
            self.tasks.uncomplete_task(task_id).await
        };

        match result {
            Ok(()) => {
                guard.commit();
                Ok(target)
            }
            Err(err) => {
                guard.rollback(|board| {
                    relocate(board, target, column, id, previous);
                });
                Err(BoardError::from_remote(err))
            }
        }
    }

    /// Apply a drop from `source` onto `target`.
    ///
    /// Moves strictly between `todo` and `inProgress` stay local. Entering
    /// `done` marks the task complete, leaving it marks it incomplete.
    #[instrument(skip_all, fields(item = %id, from = %source, to = %target))]
    pub async fn move_via_drag(
        &self,
        source: ColumnId,
        target: ColumnId,
        id: &ItemId,
    ) -> BoardResult<()> {
        if source == target {
            debug!("dropped on its own column");
            return Ok(());
        }

        let item = self.find(source, id)?;
        let transition = RemoteTransition::between(source, target);
        let status = match transition {
            RemoteTransition::Complete => TaskStatus::Completed,
            RemoteTransition::Uncomplete => TaskStatus::NeedsAction,
            RemoteTransition::None => item.status,
        };

        let Some((guard, previous)) = Optimistic::apply(&self.mirror, "move", |board| {
            relocate(board, source, target, id, status)
        }) else {
            return Err(BoardError::NotFound { item: id.clone(), column: source });
        };

        let Some(task_id) = item.task_id() else {
            guard.commit();
            return Ok(());
        };

        let result = match transition {
            RemoteTransition::Complete => self.tasks.complete_task(task_id).await,
            RemoteTransition::Uncomplete => self.tasks.uncomplete_task(task_id).await,
            RemoteTransition::None => Ok(()),
        };

        match result {
            Ok(()) => {
                guard.commit();
                Ok(())
            }
            Err(err) => {
                guard.rollback(|board| {
                    relocate(board, target, source, id, previous);
                });
                Err(BoardError::from_remote(err))
            }
        }
    }

    fn find(&self, column: ColumnId, id: &ItemId) -> BoardResult<BoardItem> {
        self.mirror
            .read(|board| board.get(column, id).cloned())
            .ok_or_else(|| BoardError::NotFound { item: id.clone(), column })
    }
}

/// Swap a pending item for its confirmed counterpart, returning the column
/// it ends up in.
///
/// A sync may have wiped the pending item or already brought in the
/// confirmed task; neither may produce a duplicate.
fn promote(
    board: &mut Board,
    pending: &ItemId,
    confirmed: BoardItem,
    fallback: ColumnId,
) -> Option<ColumnId> {
    let confirmed_id = confirmed.id.clone();
    if board.contains(pending) {
        board.replace_item(pending, confirmed);
        return board.locate(&confirmed_id).map(|(column, _)| column);
    }
    if let Some((column, _)) = board.locate(&confirmed_id) {
        return Some(column);
    }
    board.insert(fallback, confirmed).then_some(fallback)
}

/// Move `id` from `from` to `to` and set its status, returning the previous
/// status.
fn relocate(
    board: &mut Board,
    from: ColumnId,
    to: ColumnId,
    id: &ItemId,
    status: TaskStatus,
) -> Option<TaskStatus> {
    if !board.move_item(from, to, id) {
        return None;
    }
    let item = board.item_mut(id)?;
    Some(std::mem::replace(&mut item.status, status))
}

fn set_status(board: &mut Board, id: &ItemId, status: TaskStatus) -> Option<()> {
    board.item_mut(id)?.status = status;
    Some(())
}
