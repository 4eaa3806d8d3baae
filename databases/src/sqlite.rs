//! SQLite Model Store
//!
//! This module provides the SQLite-backed `ModelStore`, including
//! connection management, schema creation, and CRUD operations.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

use crate::{ModelRecord, ModelStore, StoreError};

/// Schema for the single `regressions` table
///
/// AUTOINCREMENT keeps ids monotonic: a deleted id is never handed out again.
pub const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS regressions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload BLOB NOT NULL UNIQUE
)";

/// SQLite connection manager for model records
pub struct SqliteModelStore {
    /// Database connection
    connection: Mutex<Connection>,
    /// Database path, `:memory:` for in-memory stores
    db_path: String,
}

impl SqliteModelStore {
    /// Open (or create) a store backed by the file at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening SQLite model store at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn, path.display().to_string())
    }

    /// Open a store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite model store");
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, db_path: String) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.execute(SCHEMA_SQL, [])?;

        Ok(Self {
            connection: Mutex::new(conn),
            db_path,
        })
    }

    /// Path this store was opened with
    pub fn path(&self) -> &str {
        &self.db_path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Map UNIQUE constraint failures to `StoreError::Duplicate`
fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Duplicate
        }
        _ => StoreError::Sqlite(err),
    }
}

impl ModelStore for SqliteModelStore {
    fn insert(&self, payload: &[u8]) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO regressions (payload) VALUES (?1)", params![payload])
            .map_err(classify)?;
        let id = conn.last_insert_rowid();
        debug!(id, bytes = payload.len(), "Inserted model record");
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<ModelRecord>, StoreError> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT id, payload FROM regressions WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ModelRecord {
                        id: row.get(0)?,
                        payload: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn update(&self, id: i64, payload: &[u8]) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE regressions SET payload = ?1 WHERE id = ?2",
                params![payload, id],
            )
            .map_err(classify)?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM regressions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM regressions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
