//! regressd Databases Module
//!
//! The databases module provides persistence for fitted regression models.
//! A model record is an auto-assigned integer id plus an opaque, unique
//! payload; the store never looks inside the payload.

use serde::{Deserialize, Serialize};

pub mod sqlite;
pub use sqlite::{SqliteModelStore, SCHEMA_SQL};

/// A persisted model record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Store-assigned identifier, never changes after creation
    pub id: i64,
    /// Serialized model bytes
    pub payload: Vec<u8>,
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an identical payload is already stored")]
    Duplicate,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store connection lock poisoned")]
    LockPoisoned,
}

/// Persistence operations needed by the regression service
///
/// Every mutation is committed before the call returns.
pub trait ModelStore: Send + Sync {
    /// Insert a new record and return its id
    fn insert(&self, payload: &[u8]) -> Result<i64, StoreError>;

    /// Load a record by id
    fn get(&self, id: i64) -> Result<Option<ModelRecord>, StoreError>;

    /// Replace the payload of an existing record. Returns false if no record has `id`.
    fn update(&self, id: i64, payload: &[u8]) -> Result<bool, StoreError>;

    /// Delete a record permanently. Returns false if no record has `id`.
    fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Number of stored records
    fn count(&self) -> Result<u64, StoreError>;
}
