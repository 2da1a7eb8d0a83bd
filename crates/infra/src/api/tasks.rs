//! `TaskStore` over the backend's `/tasks` routes

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskboard_core::TaskStore;
use taskboard_domain::constants::DEFAULT_TASK_LIST_ID;
use taskboard_domain::{NewTask, Result, Task, TaskStatus};
use tracing::{debug, instrument, warn};

use super::client::BackendClient;

/// Task as the backend serializes it. Every field is optional and `status`
/// is kept raw so unknown values read as "still open".
#[derive(Debug, Deserialize)]
struct RemoteTask {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl From<RemoteTask> for Task {
    fn from(remote: RemoteTask) -> Self {
        Task {
            id: remote.id,
            title: remote.title.unwrap_or_default(),
            notes: remote.notes.unwrap_or_default(),
            status: remote.status.as_deref().map(TaskStatus::from_remote).unwrap_or_default(),
        }
    }
}

/// `GET /tasks/` answers either a bare array or `{"tasks": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskListResponse {
    Bare(Vec<RemoteTask>),
    Wrapped {
        #[serde(default, alias = "items")]
        tasks: Option<Vec<RemoteTask>>,
    },
}

impl TaskListResponse {
    fn into_tasks(self) -> Vec<RemoteTask> {
        match self {
            Self::Bare(tasks) => tasks,
            Self::Wrapped { tasks } => tasks.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateTaskRequest<'a> {
    title: &'a str,
    notes: &'a str,
    task_list_id: &'a str,
}

/// Remote task store backed by the REST API.
pub struct HttpTaskStore {
    client: Arc<BackendClient>,
    task_list_id: String,
}

impl HttpTaskStore {
    /// Store for the default task list.
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client, task_list_id: DEFAULT_TASK_LIST_ID.to_string() }
    }

    /// Scope every call to `task_list_id` instead of the default list.
    pub fn with_task_list(mut self, task_list_id: impl Into<String>) -> Self {
        self.task_list_id = task_list_id.into();
        self
    }

    /// Task list calls are scoped to.
    pub fn task_list_id(&self) -> &str {
        &self.task_list_id
    }

    fn scope(&self) -> [(&'static str, &str); 1] {
        [("task_list_id", self.task_list_id.as_str())]
    }

    fn task_path(id: &str, action: Option<&str>) -> String {
        let encoded = urlencoding::encode(id);
        match action {
            Some(action) => format!("/tasks/{encoded}/{action}"),
            None => format!("/tasks/{encoded}"),
        }
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    #[instrument(skip(self), fields(task_list = %self.task_list_id))]
    async fn list_tasks(&self, include_completed: bool) -> Result<Vec<Task>> {
        let show_completed = if include_completed { "true" } else { "false" };
        let response: TaskListResponse = self
            .client
            .get_with_query(
                "/tasks/",
                &[("task_list_id", self.task_list_id.as_str()), ("show_completed", show_completed)],
            )
            .await?;

        let mut tasks = Vec::new();
        for remote in response.into_tasks() {
            if remote.id.trim().is_empty() {
                warn!("skipping remote task without an id");
                continue;
            }
            let task = Task::from(remote);
            if include_completed || !task.status.is_completed() {
                tasks.push(task);
            }
        }

        debug!(count = tasks.len(), "listed remote tasks");
        Ok(tasks)
    }

    #[instrument(skip_all, fields(task_list = %self.task_list_id))]
    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let request = CreateTaskRequest {
            title: &task.title,
            notes: &task.notes,
            task_list_id: &self.task_list_id,
        };
        let created: RemoteTask = self.client.post("/tasks/", &request).await?;

        debug!(task_id = %created.id, "created remote task");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn complete_task(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .put(&Self::task_path(id, Some("complete")), &self.scope())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn uncomplete_task(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .put(&Self::task_path(id, Some("uncomplete")), &self.scope())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .delete(&Self::task_path(id, None), &self.scope())
            .await?;
        Ok(())
    }
}
