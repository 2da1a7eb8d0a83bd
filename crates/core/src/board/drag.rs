//! Drag session state machine
//!
//! `Idle -> Dragging -> (Dropped | Cancelled) -> Idle`. The controller only
//! tracks the gesture; the drop itself is carried out by the mutation
//! controller once the session has been taken.

use parking_lot::Mutex;
use taskboard_domain::{Board, ColumnId, ItemId};
use tracing::debug;

use crate::errors::{BoardError, BoardResult};

/// The captured (item, source column) pair of a live drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// Item being dragged.
    pub item: ItemId,
    /// Column the drag started in.
    pub source: ColumnId,
}

/// Whether a drag is live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag.
    #[default]
    Idle,
    /// A drag is live.
    Dragging(DragSession),
}

/// Holds at most one live drag.
#[derive(Debug, Default)]
pub struct DragController {
    state: Mutex<DragState>,
}

impl DragController {
    /// Idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DragState {
        self.state.lock().clone()
    }

    /// True while a drag is live.
    pub fn is_dragging(&self) -> bool {
        matches!(*self.state.lock(), DragState::Dragging(_))
    }

    /// Pointer-down over `item` in `source`.
    pub fn begin(&self, board: &Board, item: ItemId, source: ColumnId) -> BoardResult<()> {
        let mut state = self.state.lock();
        if matches!(*state, DragState::Dragging(_)) {
            return Err(BoardError::DragInProgress);
        }
        if board.get(source, &item).is_none() {
            return Err(BoardError::NotFound { item, column: source });
        }
        debug!(%item, %source, "drag started");
        *state = DragState::Dragging(DragSession { item, source });
        Ok(())
    }

    /// Hovering a column while dragging. Pure affordance: reports whether a
    /// drop there would move the item, and changes nothing.
    pub fn hover(&self, column: ColumnId) -> bool {
        match &*self.state.lock() {
            DragState::Dragging(session) => session.source != column,
            DragState::Idle => false,
        }
    }

    /// Consume the session for a drop on a column, returning to `Idle`.
    pub fn take(&self) -> BoardResult<DragSession> {
        match std::mem::take(&mut *self.state.lock()) {
            DragState::Dragging(session) => Ok(session),
            DragState::Idle => Err(BoardError::NoActiveDrag),
        }
    }

    /// Drop outside any column or explicit cancel. No mutation happens.
    pub fn cancel(&self) -> Option<DragSession> {
        match std::mem::take(&mut *self.state.lock()) {
            DragState::Dragging(session) => {
                debug!(item = %session.item, "drag cancelled");
                Some(session)
            }
            DragState::Idle => None,
        }
    }
}
