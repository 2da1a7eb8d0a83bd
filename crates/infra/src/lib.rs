//! # Taskboard Infrastructure
//!
//! Infrastructure implementations of the core board ports.
//!
//! This crate contains:
//! - HTTP client with retry/backoff and the REST backend client
//! - `TaskStore` / `CalendarFeed` adapters over the backend
//! - SQLite-backed board snapshot storage
//! - The trigger scheduler driving reconciliation
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `taskboard-core`
//! - Contains all "impure" code (network, disk, timers)

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod scheduling;

pub use api::{
    auth_status, BackendClient, BackendConfig, HttpCalendarFeed, HttpTaskStore,
    SessionTokenProvider, StaticSessionToken,
};
pub use database::SqliteSnapshotRepository;
pub use errors::InfraError;
pub use http::HttpClient;
pub use scheduling::{SchedulerError, TriggerScheduler, TriggerSchedulerConfig};
