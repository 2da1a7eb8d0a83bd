//! Board model: three ordered columns of board items.
//!
//! The board is the client-side mirror of the remote task collection. Column
//! placement for `todo` and `done` is derived from [`TaskStatus`]; the
//! `inProgress` column has no remote representation and only ever holds items
//! the user parked there.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{CalendarEvent, Task, TaskStatus};
use crate::constants::{CALENDAR_ITEM_PREFIX, PENDING_ITEM_PREFIX, TASK_ITEM_PREFIX};
use crate::impl_domain_status_conversions;

/// Board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    /// Not started.
    Todo,
    /// Parked by the user; never reported remotely.
    InProgress,
    /// Completed remotely.
    Done,
}

impl_domain_status_conversions!(ColumnId {
    Todo => "todo",
    InProgress => "inProgress",
    Done => "done",
});

impl ColumnId {
    /// Columns in render order.
    pub const ALL: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done];

    /// Human readable column heading.
    pub fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Column a remote task lands in during reconciliation.
    ///
    /// Never returns [`ColumnId::InProgress`].
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Completed => Self::Done,
            TaskStatus::NeedsAction => Self::Todo,
        }
    }

    /// Remote status an item placed in this column carries.
    pub fn remote_status(self) -> TaskStatus {
        match self {
            Self::Done => TaskStatus::Completed,
            Self::Todo | Self::InProgress => TaskStatus::NeedsAction,
        }
    }

    /// `inProgress` exists only on the client.
    pub fn is_local_only(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

/// Remote write implied by moving an item between two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteTransition {
    /// Moves within the open columns have no remote counterpart.
    None,
    /// Item entered `done`.
    Complete,
    /// Item left `done`.
    Uncomplete,
}

impl RemoteTransition {
    /// Write needed when an item moves from `from` to `to`.
    pub fn between(from: ColumnId, to: ColumnId) -> Self {
        match (from == ColumnId::Done, to == ColumnId::Done) {
            (false, true) => Self::Complete,
            (true, false) => Self::Uncomplete,
            _ => Self::None,
        }
    }

    /// Whether the move has to be written remotely.
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Board-local identifier.
///
/// Derived from the remote identifier rather than the column, so an item
/// keeps its identity when dragged between columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Identity of a remote task.
    pub fn for_task(remote_id: &str) -> Self {
        Self(format!("{TASK_ITEM_PREFIX}{remote_id}"))
    }

    /// Identity of a calendar event.
    pub fn for_event(event_id: &str) -> Self {
        Self(format!("{CALENDAR_ITEM_PREFIX}{event_id}"))
    }

    /// Fresh identifier for an item the remote store has not acknowledged.
    pub fn pending() -> Self {
        Self(format!("{PENDING_ITEM_PREFIX}{}", Uuid::new_v4()))
    }

    /// Raw id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Not yet acknowledged by the remote store.
    pub fn is_pending(&self) -> bool {
        self.0.starts_with(PENDING_ITEM_PREFIX)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What a board item stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// Acknowledged remote task.
    Task,
    /// Optimistically created, remote create still in flight.
    LocalPending,
    /// Calendar event, read-only with respect to the task store.
    CalendarEvent,
}

/// Item rendered on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    /// Stable board identity.
    pub id: ItemId,
    /// What the item stands for.
    pub kind: ItemKind,
    /// Originating remote identifier; `None` until the remote store
    /// acknowledges a pending item.
    pub remote_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Free-form notes, empty for events.
    #[serde(default)]
    pub notes: String,
    /// Remote status; `Completed` only in `done`.
    #[serde(default)]
    pub status: TaskStatus,
}

impl BoardItem {
    /// Acknowledged remote task.
    pub fn from_task(task: Task) -> Self {
        Self {
            id: ItemId::for_task(&task.id),
            kind: ItemKind::Task,
            remote_id: Some(task.id),
            title: task.title,
            notes: task.notes,
            status: task.status,
        }
    }

    /// Optimistic item for a create still in flight.
    pub fn pending(title: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            id: ItemId::pending(),
            kind: ItemKind::LocalPending,
            remote_id: None,
            title: title.into(),
            notes: notes.into(),
            status: TaskStatus::NeedsAction,
        }
    }

    /// Read-only calendar entry.
    pub fn from_event(event: CalendarEvent) -> Self {
        Self {
            id: ItemId::for_event(&event.id),
            kind: ItemKind::CalendarEvent,
            remote_id: None,
            title: event.summary,
            notes: String::new(),
            status: TaskStatus::NeedsAction,
        }
    }

    /// Remote task identifier, only for items the task store knows about.
    pub fn task_id(&self) -> Option<&str> {
        match self.kind {
            ItemKind::Task => self.remote_id.as_deref(),
            ItemKind::LocalPending | ItemKind::CalendarEvent => None,
        }
    }

    /// Still waiting for the remote create.
    pub fn is_pending(&self) -> bool {
        matches!(self.kind, ItemKind::LocalPending)
    }
}

/// The three columns of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Open items.
    pub todo: Vec<BoardItem>,
    /// Items parked locally.
    pub in_progress: Vec<BoardItem>,
    /// Completed items.
    pub done: Vec<BoardItem>,
}

impl Board {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of one column, in render order.
    pub fn column(&self, column: ColumnId) -> &[BoardItem] {
        match column {
            ColumnId::Todo => &self.todo,
            ColumnId::InProgress => &self.in_progress,
            ColumnId::Done => &self.done,
        }
    }

    /// Mutable access to one column.
    pub fn column_mut(&mut self, column: ColumnId) -> &mut Vec<BoardItem> {
        match column {
            ColumnId::Todo => &mut self.todo,
            ColumnId::InProgress => &mut self.in_progress,
            ColumnId::Done => &mut self.done,
        }
    }

    /// Iterate every item with its column, in render order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &BoardItem)> {
        ColumnId::ALL
            .into_iter()
            .flat_map(move |column| self.column(column).iter().map(move |item| (column, item)))
    }

    /// Item count across all columns.
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    /// True when no column holds an item.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column and position of an item.
    pub fn locate(&self, id: &ItemId) -> Option<(ColumnId, usize)> {
        ColumnId::ALL.into_iter().find_map(|column| {
            self.column(column).iter().position(|item| &item.id == id).map(|idx| (column, idx))
        })
    }

    /// Column and item for `id`.
    pub fn find(&self, id: &ItemId) -> Option<(ColumnId, &BoardItem)> {
        self.locate(id).map(|(column, idx)| (column, &self.column(column)[idx]))
    }

    /// Whether `id` is anywhere on the board.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.locate(id).is_some()
    }

    /// Item with `id` if it currently sits in `column`.
    pub fn get(&self, column: ColumnId, id: &ItemId) -> Option<&BoardItem> {
        self.column(column).iter().find(|item| &item.id == id)
    }

    /// Mutable access to the item with `id`, whichever column it is in.
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut BoardItem> {
        let (column, idx) = self.locate(id)?;
        self.column_mut(column).get_mut(idx)
    }

    /// Append an item to a column.
    ///
    /// Returns `false` and leaves the board untouched when an item with the
    /// same id already sits in any column.
    pub fn insert(&mut self, column: ColumnId, item: BoardItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.column_mut(column).push(item);
        true
    }

    /// Insert at `index`, clamped to the column length.
    pub fn insert_at(&mut self, column: ColumnId, index: usize, item: BoardItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        let items = self.column_mut(column);
        let index = index.min(items.len());
        items.insert(index, item);
        true
    }

    /// Take `id` out of `column`.
    pub fn remove(&mut self, column: ColumnId, id: &ItemId) -> Option<BoardItem> {
        let items = self.column_mut(column);
        let idx = items.iter().position(|item| &item.id == id)?;
        Some(items.remove(idx))
    }

    /// Take `id` out of whichever column holds it.
    pub fn remove_anywhere(&mut self, id: &ItemId) -> Option<(ColumnId, BoardItem)> {
        let (column, idx) = self.locate(id)?;
        Some((column, self.column_mut(column).remove(idx)))
    }

    /// Move an item from `from` to the end of `to`.
    ///
    /// Returns `false` when the item is not in `from`.
    pub fn move_item(&mut self, from: ColumnId, to: ColumnId, id: &ItemId) -> bool {
        if from == to {
            return self.get(from, id).is_some();
        }
        match self.remove(from, id) {
            Some(item) => {
                self.column_mut(to).push(item);
                true
            }
            None => false,
        }
    }

    /// Swap the item `id` for `replacement`, keeping its position.
    ///
    /// When `replacement` carries an id already present elsewhere on the
    /// board, the old item is dropped instead so no id appears twice.
    pub fn replace_item(&mut self, id: &ItemId, replacement: BoardItem) -> bool {
        let Some((column, idx)) = self.locate(id) else {
            return false;
        };
        if &replacement.id != id && self.contains(&replacement.id) {
            self.column_mut(column).remove(idx);
            return true;
        }
        self.column_mut(column)[idx] = replacement;
        true
    }

    /// Every id appears at most once across all columns.
    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.len());
        self.iter().all(|(_, item)| seen.insert(&item.id))
    }

    /// Empty every column.
    pub fn clear(&mut self) {
        self.todo.clear();
        self.in_progress.clear();
        self.done.clear();
    }
}
