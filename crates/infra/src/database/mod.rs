//! SQLite-backed local storage

pub mod snapshot_repository;

pub use snapshot_repository::SqliteSnapshotRepository;
