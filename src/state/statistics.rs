//! Aggregate counters and the error ledger for one run
//!
//! `RunStatistics` is owned by a single accumulator task inside the run
//! controller; workers never touch it directly.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Number of ledger entries kept in a serialized summary
pub const SUMMARY_ERROR_LIMIT: usize = 100;

/// One failed attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub id: u64,
    pub message: String,
}

/// Running totals for a harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    pub start_id: u64,
    pub end_id: u64,
    pub total_attempted: u64,
    pub successful: u64,
    pub failed: u64,

    /// Successful fetches whose record could not be written
    pub persist_failures: u64,

    /// Every failure in arrival order; never truncated during the run
    errors: Vec<ErrorEntry>,
}

/// Serialized form of [`RunStatistics`] written to the summary file
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord<'a> {
    pub start_id: u64,
    pub end_id: u64,
    pub total_attempted: u64,
    pub successful: u64,
    pub failed: u64,
    pub timestamp: DateTime<Local>,
    pub errors: &'a [ErrorEntry],
}

impl RunStatistics {
    pub fn new(start_id: u64, end_id: u64) -> Self {
        Self {
            start_id,
            end_id,
            total_attempted: 0,
            successful: 0,
            failed: 0,
            persist_failures: 0,
            errors: Vec::new(),
        }
    }

    /// Counts a successful attempt
    pub fn record_success(&mut self) {
        self.total_attempted += 1;
        self.successful += 1;
    }

    /// Counts a failed attempt and appends it to the ledger
    pub fn record_failure(&mut self, id: u64, message: impl Into<String>) {
        self.total_attempted += 1;
        self.failed += 1;
        self.errors.push(ErrorEntry {
            id,
            message: message.into(),
        });
    }

    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    /// Full error ledger in insertion order
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Number of identifiers in the configured range
    pub fn range_len(&self) -> u64 {
        self.end_id - self.start_id + 1
    }

    /// Percentage of attempted identifiers that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            0.0
        } else {
            self.successful as f64 / self.total_attempted as f64 * 100.0
        }
    }

    /// Builds the summary view, keeping the first [`SUMMARY_ERROR_LIMIT`] errors
    pub fn to_summary(&self, timestamp: DateTime<Local>) -> SummaryRecord<'_> {
        let cap = self.errors.len().min(SUMMARY_ERROR_LIMIT);
        SummaryRecord {
            start_id: self.start_id,
            end_id: self.end_id,
            total_attempted: self.total_attempted,
            successful: self.successful,
            failed: self.failed,
            timestamp,
            errors: &self.errors[..cap],
        }
    }
}
