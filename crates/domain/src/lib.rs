//! # Taskboard Domain
//!
//! Business domain types and models for the task board.
//!
//! This crate contains:
//! - Remote task and calendar event shapes (`Task`, `CalendarEvent`)
//! - The board model (`Board`, `BoardItem`, `ColumnId`, `ItemId`)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Taskboard crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::title::{display_title, normalize_title};
