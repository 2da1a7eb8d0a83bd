//! SQLite implementation of the `SnapshotStore` port.
//!
//! One row per key; the board is stored as JSON so a snapshot written by an
//! older build can still be read (unknown fields are ignored).

use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use taskboard_core::SnapshotStore;
use taskboard_domain::{Board, Result, TaskboardError};
use tracing::{debug, instrument};

use crate::errors::InfraError;

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS board_snapshots (
        key      TEXT PRIMARY KEY NOT NULL,
        payload  TEXT NOT NULL,
        saved_at INTEGER NOT NULL
    );
";

/// Board snapshots in a single SQLite file.
pub struct SqliteSnapshotRepository {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotRepository {
    /// Open (or create) the snapshot database at `path`.
    ///
    /// Missing parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                TaskboardError::Storage(format!(
                    "failed to create snapshot directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(map_sql_error)?;
        debug!(path = %path.display(), "opened snapshot database");
        Self::with_connection(conn)
    }

    /// Snapshot store that lives only as long as the process.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(map_sql_error)?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Unix timestamp of the last save under `key`.
    pub fn saved_at(&self, key: &str) -> Result<Option<i64>> {
        self.conn
            .lock()
            .query_row("SELECT saved_at FROM board_snapshots WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(map_sql_error)
    }
}

impl SnapshotStore for SqliteSnapshotRepository {
    #[instrument(skip(self))]
    fn load(&self, key: &str) -> Result<Option<Board>> {
        let payload: Option<String> = self
            .conn
            .lock()
            .query_row("SELECT payload FROM board_snapshots WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(map_sql_error)?;

        payload
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    TaskboardError::Storage(format!("corrupt board snapshot under {key}: {e}"))
                })
            })
            .transpose()
    }

    #[instrument(skip(self, board), fields(items = board.len()))]
    fn save(&self, key: &str, board: &Board) -> Result<()> {
        let payload = serde_json::to_string(board)
            .map_err(|e| TaskboardError::Internal(format!("failed to encode board: {e}")))?;

        self.conn
            .lock()
            .execute(
                "INSERT INTO board_snapshots (key, payload, saved_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET payload = excluded.payload,
                                                saved_at = excluded.saved_at",
                params![key, payload, Utc::now().timestamp()],
            )
            .map_err(map_sql_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn clear(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM board_snapshots WHERE key = ?1", params![key])
            .map_err(map_sql_error)?;
        Ok(())
    }
}

fn map_sql_error(err: rusqlite::Error) -> TaskboardError {
    TaskboardError::from(InfraError::from(err))
}
