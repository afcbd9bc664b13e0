//! JSON run summary
//!
//! The summary is rewritten in full on every call: the payload goes to a
//! sibling temporary file which is then renamed over the previous summary.

use crate::output::{OutputError, OutputResult};
use crate::state::RunStatistics;
use chrono::Local;
use std::path::PathBuf;

/// Writes [`RunStatistics`] to a JSON summary file
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    path: PathBuf,
}

impl SummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Serializes `stats` and replaces any previous summary
    ///
    /// Only the first 100 ledger entries are written.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the summary was written
    /// * `Err(OutputError)` - Serialization or the write failed
    pub fn write(&self, stats: &RunStatistics) -> OutputResult<PathBuf> {
        let summary = stats.to_summary(Local::now());
        let json = serde_json::to_string_pretty(&summary)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes()).map_err(|source| OutputError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| OutputError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Summary written to {} ({} errors recorded)",
            self.path.display(),
            summary.errors.len()
        );

        Ok(self.path.clone())
    }
}
