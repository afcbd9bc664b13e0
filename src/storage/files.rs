//! One-file-per-record storage

use crate::storage::traits::{Record, RecordSink, StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Writes each record to `{directory}/record_{id}.txt`
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    /// Creates a sink writing into `directory`, creating it if needed
    pub fn new(directory: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    /// Path of the file holding the record for `id`
    pub fn record_path(&self, id: u64) -> PathBuf {
        self.directory.join(record_file_name(id))
    }
}

/// Deterministic file name for an identifier
pub fn record_file_name(id: u64) -> String {
    format!("record_{}.txt", id)
}

impl RecordSink for FileSink {
    fn store(&self, record: &Record) -> StorageResult<()> {
        let path = self.record_path(record.id);
        std::fs::write(&path, &record.payload).map_err(|source| StorageError::Write {
            id: record.id,
            path,
            source,
        })
    }

    fn describe(&self) -> String {
        format!("files in {}", self.directory.display())
    }
}
