//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a record
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write record {id} to {path}: {source}")]
    Write {
        id: u64,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Identifier {0} does not fit the database key")]
    IdOutOfRange(u64),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A successfully fetched payload ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub content_type: String,
    pub payload: Vec<u8>,
}

/// Trait for durable record storage
///
/// Storing the same identifier twice must leave exactly one record holding
/// the latest payload. Implementations are shared across workers and called
/// from the blocking thread pool.
pub trait RecordSink: Send + Sync {
    /// Persists `record`, replacing any previous record with the same id
    fn store(&self, record: &Record) -> StorageResult<()>;

    /// Short name used in logs and reports
    fn describe(&self) -> String;
}
