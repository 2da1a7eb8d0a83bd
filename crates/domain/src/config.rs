//! Configuration structures
//!
//! Loaded by `taskboard_infra::config` from the environment or a JSON/TOML
//! file. Every section has defaults so a partial file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOARD_SNAPSHOT_KEY, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_SYNC_INTERVAL_SECS,
    DEFAULT_SYNC_JOB_TIMEOUT_SECS, DEFAULT_TASK_LIST_ID,
};
use crate::errors::{Result, TaskboardError};
use crate::impl_domain_status_conversions;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,
    /// Reconciliation behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Local snapshot persistence.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(TaskboardError::Config("api.base_url must not be empty".into()));
        }
        if self.api.timeout_seconds == 0 {
            return Err(TaskboardError::Config("api.timeout_seconds must be positive".into()));
        }
        if self.sync.interval_seconds == 0 {
            return Err(TaskboardError::Config("sync.interval_seconds must be positive".into()));
        }
        if self.storage.snapshot_key.trim().is_empty() {
            return Err(TaskboardError::Config("storage.snapshot_key must not be empty".into()));
        }
        Ok(())
    }
}

/// REST backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
    /// Task list every call is scoped to.
    #[serde(default = "default_task_list")]
    pub task_list_id: String,
    /// Session id sent as `Authorization: Bearer <id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_api_timeout(),
            task_list_id: default_task_list(),
            session_token: None,
        }
    }
}

/// What a full reconciliation does with items parked in `inProgress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InProgressPolicy {
    /// Keep parked items whose remote task is still open.
    #[default]
    Preserve,
    /// Empty the column on every reconciliation.
    Clear,
}

impl_domain_status_conversions!(InProgressPolicy {
    Preserve => "preserve",
    Clear => "clear",
});

/// Reconciliation and scheduling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Period of the background reconciliation.
    #[serde(default = "default_sync_interval")]
    pub interval_seconds: u64,
    /// Fetch completed tasks into `done`.
    #[serde(default = "default_true")]
    pub include_completed: bool,
    /// What a full sync does with `inProgress`.
    #[serde(default)]
    pub in_progress_policy: InProgressPolicy,
    /// Show upcoming calendar events at the top of `todo`.
    #[serde(default)]
    pub include_calendar_events: bool,
    /// Upper bound on a single scheduled sync.
    #[serde(default = "default_job_timeout")]
    pub job_timeout_seconds: u64,
}

impl SyncConfig {
    /// Sync period as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Sync job limit as a [`Duration`].
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_sync_interval(),
            include_completed: true,
            in_progress_policy: InProgressPolicy::default(),
            include_calendar_events: false,
            job_timeout_seconds: default_job_timeout(),
        }
    }
}

/// Local snapshot persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding board snapshots; persistence is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
    /// Key the board is stored under.
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { snapshot_path: None, snapshot_key: default_snapshot_key() }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_timeout() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_task_list() -> String {
    DEFAULT_TASK_LIST_ID.to_string()
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_job_timeout() -> u64 {
    DEFAULT_SYNC_JOB_TIMEOUT_SECS
}

fn default_snapshot_key() -> String {
    BOARD_SNAPSHOT_KEY.to_string()
}

fn default_true() -> bool {
    true
}
