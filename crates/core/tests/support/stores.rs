//! Mock port implementations for testing
//!
//! In-memory stand-ins for the task store, calendar feed and snapshot store.
//! `MockTaskStore` keeps a call log, accepts scripted failures per operation
//! and can hold an operation until the test releases it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskboard_core::{CalendarFeed, SnapshotStore, TaskStore};
use taskboard_domain::{
    Board, CalendarEvent, NewTask, Result as DomainResult, Task, TaskStatus, TaskboardError,
};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Complete,
    Uncomplete,
    Delete,
}

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { include_completed: bool },
    Create { title: String, notes: String },
    Complete(String),
    Uncomplete(String),
    Delete(String),
}

/// In-memory task store.
#[derive(Default)]
pub struct MockTaskStore {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, VecDeque<TaskboardError>>>,
    gates: Mutex<HashMap<Op, Arc<Notify>>>,
    next_id: AtomicU64,
}

impl MockTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks: Mutex::new(tasks), next_id: AtomicU64::new(100), ..Self::default() }
    }

    pub fn shared(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self::new(tasks))
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: Op, error: TaskboardError) {
        self.failures.lock().entry(op).or_default().push_back(error);
    }

    /// Block calls of `op` until the returned handle is notified.
    pub fn hold(&self, op: Op) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(op, gate.clone());
        gate
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.lock() = tasks;
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls other than listing.
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| !matches!(call, Call::List { .. })).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    async fn enter(&self, op: Op, call: Call) -> DomainResult<()> {
        self.calls.lock().push(call);
        let gate = self.gates.lock().get(&op).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let failure = self.failures.lock().get_mut(&op).and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_status(&self, id: &str, status: TaskStatus) -> DomainResult<()> {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskboardError::NotFound(id.to_string()))?;
        task.status = status;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn list_tasks(&self, include_completed: bool) -> DomainResult<Vec<Task>> {
        self.enter(Op::List, Call::List { include_completed }).await?;
        Ok(self
            .tasks
            .lock()
            .iter()
            .filter(|task| include_completed || !task.status.is_completed())
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: NewTask) -> DomainResult<Task> {
        self.enter(Op::Create, Call::Create { title: task.title.clone(), notes: task.notes.clone() })
            .await?;
        let created = Task {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            title: task.title,
            notes: task.notes,
            status: task.status.unwrap_or_default(),
        };
        self.tasks.lock().push(created.clone());
        Ok(created)
    }

    async fn complete_task(&self, id: &str) -> DomainResult<()> {
        self.enter(Op::Complete, Call::Complete(id.to_string())).await?;
        self.set_status(id, TaskStatus::Completed)
    }

    async fn uncomplete_task(&self, id: &str) -> DomainResult<()> {
        self.enter(Op::Uncomplete, Call::Uncomplete(id.to_string())).await?;
        self.set_status(id, TaskStatus::NeedsAction)
    }

    async fn delete_task(&self, id: &str) -> DomainResult<()> {
        self.enter(Op::Delete, Call::Delete(id.to_string())).await?;
        self.tasks.lock().retain(|task| task.id != id);
        Ok(())
    }
}

/// Calendar feed returning a fixed list, optionally failing.
#[derive(Default)]
pub struct MockCalendarFeed {
    events: Mutex<Vec<CalendarEvent>>,
    failure: Mutex<Option<TaskboardError>>,
}

impl MockCalendarFeed {
    pub fn shared(events: Vec<CalendarEvent>) -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(events), failure: Mutex::new(None) })
    }

    pub fn fail_next(&self, error: TaskboardError) {
        *self.failure.lock() = Some(error);
    }
}

#[async_trait]
impl CalendarFeed for MockCalendarFeed {
    async fn list_events(&self) -> DomainResult<Vec<CalendarEvent>> {
        if let Some(err) = self.failure.lock().take() {
            return Err(err);
        }
        Ok(self.events.lock().clone())
    }
}

/// Snapshot store keeping boards in a map.
#[derive(Default)]
pub struct MemorySnapshotStore {
    boards: Mutex<HashMap<String, Board>>,
}

impl MemorySnapshotStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, key: &str) -> Option<Board> {
        self.boards.lock().get(key).cloned()
    }

    pub fn put(&self, key: &str, board: Board) {
        self.boards.lock().insert(key.to_string(), board);
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> DomainResult<Option<Board>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, board: &Board) -> DomainResult<()> {
        self.put(key, board.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> DomainResult<()> {
        self.boards.lock().remove(key);
        Ok(())
    }
}
