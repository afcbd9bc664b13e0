//! Output module for run summaries and reports
//!
//! This module handles:
//! - Writing the JSON summary of a run
//! - Printing the end-of-run report
//! - Rendering live progress in the terminal

mod progress;
mod report;
mod summary;

pub use progress::ProgressDisplay;
pub use report::{format_report, print_report};
pub use summary::SummaryWriter;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
