//! Application context - dependency injection container

use std::sync::Arc;

use taskboard_core::{BoardOptions, CalendarFeed, SnapshotStore, TaskBoard, TaskStore};
use taskboard_domain::{Config, Result, TaskboardError};
use taskboard_infra::{
    auth_status, BackendClient, BackendConfig, HttpCalendarFeed, HttpTaskStore,
    SqliteSnapshotRepository, StaticSessionToken, TriggerScheduler, TriggerSchedulerConfig,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Application context - holds the board and everything driving it
pub struct AppContext {
    /// Configuration the context was built from.
    pub config: Config,
    /// Shared REST client.
    pub client: Arc<BackendClient>,
    /// Session id sent with every backend call; replaceable at runtime.
    pub session_token: Arc<StaticSessionToken>,
    /// The board engine.
    pub board: Arc<TaskBoard>,
    scheduler: Mutex<TriggerScheduler>,
}

impl AppContext {
    /// Create a new application context with default configuration
    pub fn new() -> Result<Self> {
        Self::new_with_config(Config::default())
    }

    /// Create a new application context with custom configuration
    ///
    /// Nothing talks to the backend until [`AppContext::start`].
    ///
    /// # Errors
    /// Returns `TaskboardError::Config` for an unusable backend URL and
    /// `TaskboardError::Storage` if the snapshot database cannot be opened.
    pub fn new_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let session_token = Arc::new(StaticSessionToken::new(config.api.session_token.clone()));
        let client = Arc::new(
            BackendClient::new(BackendConfig::from(&config.api), session_token.clone())
                .map_err(TaskboardError::from)?,
        );

        let tasks: Arc<dyn TaskStore> = Arc::new(
            HttpTaskStore::new(Arc::clone(&client)).with_task_list(config.api.task_list_id.clone()),
        );

        let mut builder =
            TaskBoard::builder(tasks).with_options(BoardOptions::from_config(&config));

        if config.sync.include_calendar_events {
            let calendar: Arc<dyn CalendarFeed> =
                Arc::new(HttpCalendarFeed::new(Arc::clone(&client)));
            builder = builder.with_calendar(calendar);
        }

        if let Some(path) = config.storage.snapshot_path.as_deref() {
            let snapshots: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotRepository::open(path)?);
            builder = builder.with_snapshots(snapshots);
            info!(path, "board snapshots enabled");
        }

        let board = Arc::new(builder.build());
        let scheduler =
            TriggerScheduler::new(Arc::clone(&board), TriggerSchedulerConfig::from(&config.sync));

        Ok(Self { config, client, session_token, board, scheduler: Mutex::new(scheduler) })
    }

    /// Check the session and start the trigger scheduler.
    ///
    /// An unreachable backend is not fatal: the board starts signed out and
    /// [`AppContext::refresh_auth`] can be retried later.
    ///
    /// # Errors
    /// Returns error if the scheduler is already running.
    pub async fn start(&self) -> Result<()> {
        if let Err(err) = self.refresh_auth().await {
            warn!(error = %err, error_type = err.label(), "auth status check failed, starting signed out");
        }

        self.scheduler.lock().await.start().await?;
        info!(authenticated = self.board.is_authenticated(), "taskboard started");
        Ok(())
    }

    /// Ask the backend whether the session is signed in and report it to
    /// the board.
    ///
    /// # Errors
    /// Returns `TaskboardError::Network` if the backend cannot be reached;
    /// the session state is left untouched in that case.
    pub async fn refresh_auth(&self) -> Result<bool> {
        let authenticated = if self.session_token.is_present() {
            auth_status(&self.client).await.map_err(TaskboardError::from)?
        } else {
            false
        };

        if self.board.set_authenticated(authenticated) {
            info!(authenticated, "session state changed");
        }
        Ok(authenticated)
    }

    /// Replace the session id and check it again.
    pub async fn sign_in(&self, session_token: impl Into<String>) -> Result<bool> {
        self.session_token.set(session_token);
        self.refresh_auth().await
    }

    /// Forget the session id and sign the board out.
    pub fn sign_out(&self) {
        self.session_token.clear();
        if self.board.set_authenticated(false) {
            info!("signed out");
        }
    }

    /// True between `start` and `shutdown`.
    pub async fn is_scheduler_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Shutdown the application context gracefully
    ///
    /// Stops the scheduler if it is running. Calling it twice is fine.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            scheduler.stop().await?;
        }
        Ok(())
    }
}
