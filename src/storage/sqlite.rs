//! SQLite record storage
//!
//! This module provides a SQLite-based implementation of the RecordSink trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Record, RecordSink, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// SQLite storage backend
///
/// The connection is guarded by a mutex so the sink can be shared by all
/// workers; writes are serialized.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database or create the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Loads the stored payload for `id`, if any
    pub fn get(&self, id: u64) -> StorageResult<Option<Record>> {
        let key = row_key(id)?;
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let record = conn
            .query_row(
                "SELECT content_type, payload FROM records WHERE id = ?1",
                params![key],
                |row| {
                    Ok(Record {
                        id,
                        content_type: row.get(0)?,
                        payload: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Number of stored records
    pub fn count(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// SQLite integer keys are signed
fn row_key(id: u64) -> StorageResult<i64> {
    i64::try_from(id).map_err(|_| StorageError::IdOutOfRange(id))
}

impl RecordSink for SqliteSink {
    fn store(&self, record: &Record) -> StorageResult<()> {
        let key = row_key(record.id)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO records (id, content_type, payload, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, record.content_type, record.payload, now],
        )?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite database {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: u64, payload: &[u8]) -> Record {
        Record {
            id,
            content_type: "application/json".to_string(),
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn test_store_and_get() {
        let sink = SqliteSink::new_in_memory().unwrap();
        sink.store(&record(1000, b"{\"name\":\"a\"}")).unwrap();

        let stored = sink.get(1000).unwrap().unwrap();
        assert_eq!(stored.payload, b"{\"name\":\"a\"}");
        assert_eq!(stored.content_type, "application/json");
        assert!(sink.get(1001).unwrap().is_none());
    }

    #[test]
    fn test_store_replaces_existing_row() {
        let sink = SqliteSink::new_in_memory().unwrap();
        sink.store(&record(5, b"old")).unwrap();
        sink.store(&record(5, b"new")).unwrap();

        assert_eq!(sink.count().unwrap(), 1);
        assert_eq!(sink.get(5).unwrap().unwrap().payload, b"new");
    }

    #[test]
    fn test_binary_payload_round_trips() {
        let sink = SqliteSink::new_in_memory().unwrap();
        let bytes = [0u8, 255, 10, 13, 0];
        sink.store(&record(3, &bytes)).unwrap();
        assert_eq!(sink.get(3).unwrap().unwrap().payload, bytes);
    }

    #[test]
    fn test_id_beyond_signed_range_is_rejected() {
        let sink = SqliteSink::new_in_memory().unwrap();
        let result = sink.store(&record(u64::MAX - 1, b"x"));
        assert!(matches!(result, Err(StorageError::IdOutOfRange(_))));
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.db");

        {
            let sink = SqliteSink::new(&path).unwrap();
            sink.store(&record(1, b"persisted")).unwrap();
        }

        let sink = SqliteSink::new(&path).unwrap();
        assert_eq!(sink.count().unwrap(), 1);
        assert_eq!(sink.get(1).unwrap().unwrap().payload, b"persisted");
    }
}
