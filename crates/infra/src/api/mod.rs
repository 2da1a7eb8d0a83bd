//! Backend REST API adapters
//!
//! The backend proxies the user's Google task list and calendar. Everything
//! here goes through [`BackendClient`], which attaches the bearer session id
//! and classifies failures; the adapters implement the core ports on top.

pub mod auth;
pub mod calendar;
pub mod client;
pub mod errors;
pub mod tasks;

pub use auth::{auth_status, SessionTokenProvider, StaticSessionToken};
pub use calendar::HttpCalendarFeed;
pub use client::{BackendClient, BackendConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use tasks::HttpTaskStore;
