//! Storage module for persisting fetched records
//!
//! This module handles durable storage of successful payloads, keyed by
//! identifier:
//! - One file per record (`record_{id}.txt`)
//! - A single SQLite database with one row per record

mod files;
mod schema;
mod sqlite;
mod traits;

pub use files::{record_file_name, FileSink};
pub use sqlite::SqliteSink;
pub use traits::{Record, RecordSink, StorageError, StorageResult};

use crate::config::{OutputConfig, SinkFormat};
use std::path::Path;
use std::sync::Arc;

/// Opens the record sink selected by the output configuration
///
/// Returns `Ok(None)` when individual record saving is disabled; the run then
/// only updates its counters.
pub fn open_sink(config: &OutputConfig) -> StorageResult<Option<Arc<dyn RecordSink>>> {
    if !config.save_records {
        return Ok(None);
    }

    let sink: Arc<dyn RecordSink> = match config.format {
        SinkFormat::Files => Arc::new(FileSink::new(Path::new(&config.directory))?),
        SinkFormat::Sqlite => Arc::new(SqliteSink::new(&config.database_path())?),
    };

    Ok(Some(sink))
}
