//! Reconciliation engine
//!
//! Pulls the full remote task set and rebuilds the board from it. Column
//! placement comes from task status only: completed tasks land in `done`,
//! everything else in `todo`. The `inProgress` column is never filled from
//! remote data; what happens to items already parked there depends on the
//! [`InProgressPolicy`].
//!
//! Overlapping syncs are allowed. The last one to finish wins the board
//! replace; an older result overwriting a newer one is logged, not prevented.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::OptionFuture;
use taskboard_domain::{
    Board, BoardItem, CalendarEvent, ColumnId, InProgressPolicy, ItemId, ItemKind, Task,
};
use tracing::{debug, info, instrument, warn};

use super::mirror::LocalMirror;
use super::ports::{CalendarFeed, TaskStore};
use crate::errors::{BoardError, BoardResult};

/// How much of the remote collection a sync fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Open and completed tasks.
    Full,
    /// Open tasks only; `done` ends up empty.
    OpenOnly,
}

impl SyncScope {
    fn include_completed(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Summary of an applied sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Issue order of the sync, starting at 1.
    pub generation: u64,
    /// Items per column after the sync.
    pub todo: usize,
    /// Items parked in `inProgress`.
    pub in_progress: usize,
    /// Items in `done`.
    pub done: usize,
    /// A newer sync had already been applied before this one.
    pub stale: bool,
}

/// Fetches the remote collection and rebuilds the board from it.
///
/// Results are applied in issue order: a sync that completes after a newer
/// one was applied is reported as stale and leaves the board alone.
pub struct Reconciler {
    tasks: Arc<dyn TaskStore>,
    calendar: Option<Arc<dyn CalendarFeed>>,
    mirror: Arc<LocalMirror>,
    policy: InProgressPolicy,
    scope: SyncScope,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl Reconciler {
    /// Full-scope reconciler without a calendar feed.
    pub fn new(tasks: Arc<dyn TaskStore>, mirror: Arc<LocalMirror>) -> Self {
        Self {
            tasks,
            calendar: None,
            mirror,
            policy: InProgressPolicy::default(),
            scope: SyncScope::Full,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Place upcoming calendar events at the head of `todo`.
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarFeed>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Treatment of `inProgress` during a full sync.
    pub fn with_policy(mut self, policy: InProgressPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Scope used by [`sync`](Self::sync).
    pub fn with_scope(mut self, scope: SyncScope) -> Self {
        self.scope = scope;
        self
    }

    /// Reconcile with the configured scope.
    pub async fn sync(&self) -> BoardResult<SyncReport> {
        self.sync_scope(self.scope).await
    }

    /// Fetch the remote state and replace the board with it.
    ///
    /// On failure the board is left exactly as it was.
    #[instrument(skip(self))]
    pub async fn sync_scope(&self, scope: SyncScope) -> BoardResult<SyncReport> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.mirror.epoch();

        let events_fut: OptionFuture<_> =
            self.calendar.as_ref().map(|calendar| calendar.list_events()).into();
        let (tasks, events) =
            futures::join!(self.tasks.list_tasks(scope.include_completed()), events_fut);

        let tasks = tasks.map_err(|err| {
            warn!(error = %err, "task fetch failed, keeping current board");
            BoardError::from_sync(err)
        })?;

        let events = match events {
            None => Some(Vec::new()),
            Some(Ok(events)) => Some(events),
            Some(Err(err)) if err.is_unauthorized() => return Err(BoardError::from_sync(err)),
            Some(Err(err)) => {
                // Calendar items already on the board are kept as they are.
                warn!(error = %err, "calendar fetch failed, keeping current calendar items");
                None
            }
        };

        let policy = self.policy;
        let report = self.mirror.update_in(epoch, |current| {
            let board = classify(current, tasks, events, policy);
            let report = SyncReport {
                generation,
                todo: board.todo.len(),
                in_progress: board.in_progress.len(),
                done: board.done.len(),
                stale: false,
            };
            *current = board;
            Some(report)
        });

        let Some(mut report) = report else {
            debug!(generation, "session ended while syncing, result discarded");
            return Err(BoardError::Superseded);
        };

        let previous = self.applied.fetch_max(generation, Ordering::SeqCst);
        if previous > generation {
            report.stale = true;
            warn!(generation, previous, "older sync result replaced a newer board");
        }
        info!(
            generation,
            todo = report.todo,
            in_progress = report.in_progress,
            done = report.done,
            "board reconciled"
        );
        Ok(report)
    }
}

/// Build the reconciled board.
///
/// `events` is `None` when the calendar could not be fetched; calendar items
/// currently on the board are then carried over unchanged.
pub fn classify(
    current: &Board,
    tasks: Vec<Task>,
    events: Option<Vec<CalendarEvent>>,
    policy: InProgressPolicy,
) -> Board {
    let mut board = Board::new();

    let parked: HashSet<&ItemId> = match policy {
        InProgressPolicy::Preserve => current.in_progress.iter().map(|item| &item.id).collect(),
        InProgressPolicy::Clear => HashSet::new(),
    };

    let calendar_items: Vec<BoardItem> = match events {
        Some(events) => events.into_iter().map(BoardItem::from_event).collect(),
        None => current
            .iter()
            .filter(|(_, item)| item.kind == ItemKind::CalendarEvent)
            .map(|(_, item)| item.clone())
            .collect(),
    };

    // Calendar items never touch the task store, so local placement sticks.
    for mut item in calendar_items {
        let column = match current.locate(&item.id).map(|(column, _)| column) {
            Some(ColumnId::InProgress) if parked.contains(&item.id) => ColumnId::InProgress,
            Some(ColumnId::Done) => ColumnId::Done,
            _ => ColumnId::Todo,
        };
        item.status = column.remote_status();
        if !board.insert(column, item) {
            debug!("duplicate calendar event skipped");
        }
    }

    for task in tasks {
        let item = BoardItem::from_task(task);
        let column = match ColumnId::for_status(item.status) {
            ColumnId::Todo if parked.contains(&item.id) => ColumnId::InProgress,
            column => column,
        };
        let id = item.id.clone();
        if !board.insert(column, item) {
            debug!(item = %id, "duplicate remote task skipped");
        }
    }

    // Keep parked items in the order the user put them.
    if policy == InProgressPolicy::Preserve {
        let order: HashMap<&ItemId, usize> =
            current.in_progress.iter().enumerate().map(|(idx, item)| (&item.id, idx)).collect();
        board.in_progress.sort_by_key(|item| order.get(&item.id).copied().unwrap_or(usize::MAX));
    }

    board
}

#[cfg(test)]
mod tests {
    use taskboard_domain::TaskStatus;

    use super::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task { id: id.into(), title: format!("Task {id}"), notes: String::new(), status }
    }

    fn ids(items: &[BoardItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn status_decides_column() {
        let board = classify(
            &Board::new(),
            vec![task("1", TaskStatus::NeedsAction), task("2", TaskStatus::Completed)],
            None,
            InProgressPolicy::Preserve,
        );
        assert_eq!(ids(&board.todo), vec!["task-1"]);
        assert_eq!(ids(&board.done), vec!["task-2"]);
        assert!(board.in_progress.is_empty());
    }

    #[test]
    fn preserve_keeps_open_parked_tasks() {
        let mut current = Board::new();
        current.insert(ColumnId::InProgress, BoardItem::from_task(task("1", TaskStatus::NeedsAction)));
        current.insert(ColumnId::InProgress, BoardItem::from_task(task("2", TaskStatus::NeedsAction)));
        current.insert(ColumnId::InProgress, BoardItem::from_task(task("3", TaskStatus::NeedsAction)));

        // 1 is still open, 2 was completed elsewhere, 3 was deleted elsewhere.
        let board = classify(
            &current,
            vec![task("2", TaskStatus::Completed), task("1", TaskStatus::NeedsAction)],
            None,
            InProgressPolicy::Preserve,
        );
        assert_eq!(ids(&board.in_progress), vec!["task-1"]);
        assert_eq!(ids(&board.done), vec!["task-2"]);
        assert!(board.todo.is_empty());
    }

    #[test]
    fn clear_policy_empties_in_progress() {
        let mut current = Board::new();
        current.insert(ColumnId::InProgress, BoardItem::from_task(task("1", TaskStatus::NeedsAction)));

        let board = classify(
            &current,
            vec![task("1", TaskStatus::NeedsAction)],
            None,
            InProgressPolicy::Clear,
        );
        assert_eq!(ids(&board.todo), vec!["task-1"]);
        assert!(board.in_progress.is_empty());
    }

    #[test]
    fn calendar_events_lead_todo() {
        let board = classify(
            &Board::new(),
            vec![task("1", TaskStatus::NeedsAction)],
            Some(vec![CalendarEvent { id: "e1".into(), summary: "Standup".into() }]),
            InProgressPolicy::Preserve,
        );
        assert_eq!(ids(&board.todo), vec!["cal-e1", "task-1"]);
    }

    #[test]
    fn failed_calendar_fetch_keeps_existing_calendar_items() {
        let mut current = Board::new();
        current.insert(
            ColumnId::Done,
            BoardItem::from_event(CalendarEvent { id: "e1".into(), summary: "Review".into() }),
        );

        let board = classify(&current, vec![], None, InProgressPolicy::Preserve);
        assert_eq!(ids(&board.done), vec!["cal-e1"]);
    }

    #[test]
    fn duplicate_remote_ids_appear_once() {
        let board = classify(
            &Board::new(),
            vec![task("1", TaskStatus::NeedsAction), task("1", TaskStatus::Completed)],
            None,
            InProgressPolicy::Preserve,
        );
        assert_eq!(board.len(), 1);
        assert!(board.is_well_formed());
    }
}
