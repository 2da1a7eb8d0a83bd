//! # Taskboard App
//!
//! Headless application layer - wiring and main entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Logging setup
//! - The `taskboard` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the backend adapters into the board engine and starts the
//!   trigger scheduler

pub mod context;
pub mod utils;

pub use context::AppContext;
