//! State management for harvest runs
//!
//! This module contains the run lifecycle state machine and the aggregate
//! statistics accumulated while a run is in progress.

mod run_state;
mod statistics;

pub use run_state::RunState;
pub use statistics::{ErrorEntry, RunStatistics, SummaryRecord, SUMMARY_ERROR_LIMIT};
