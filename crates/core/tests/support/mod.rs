//! Shared test helpers for `taskboard-core` integration tests.
//!
//! These helpers provide in-memory port implementations that record every
//! call and can be scripted to fail, so board tests can focus on behaviour
//! instead of boilerplate.

#![allow(dead_code)]

pub mod stores;

use std::sync::Arc;

use taskboard_core::{BoardOptions, BroadcastBus, TaskBoard};
use taskboard_domain::{Task, TaskStatus};

pub use stores::{Call, MemorySnapshotStore, MockCalendarFeed, MockTaskStore, Op};

pub fn task(id: &str, status: TaskStatus) -> Task {
    Task { id: id.into(), title: format!("Task {id}"), notes: String::new(), status }
}

pub fn open(id: &str) -> Task {
    task(id, TaskStatus::NeedsAction)
}

pub fn completed(id: &str) -> Task {
    task(id, TaskStatus::Completed)
}

/// Board over `store` with default options, already signed in.
pub fn signed_in_board(store: &Arc<MockTaskStore>) -> TaskBoard {
    let board = TaskBoard::builder(store.clone()).build();
    board.set_authenticated(true);
    board
}

/// Board with every collaborator injected, not yet signed in.
pub fn full_board(
    store: &Arc<MockTaskStore>,
    calendar: &Arc<MockCalendarFeed>,
    snapshots: &Arc<MemorySnapshotStore>,
    bus: &Arc<BroadcastBus>,
    options: BoardOptions,
) -> TaskBoard {
    TaskBoard::builder(store.clone())
        .with_calendar(calendar.clone())
        .with_snapshots(snapshots.clone())
        .with_bus(bus.clone())
        .with_options(options)
        .build()
}

/// Board-local ids of a column, for compact assertions.
pub fn ids(items: &[taskboard_domain::BoardItem]) -> Vec<String> {
    items.iter().map(|item| item.id.to_string()).collect()
}
