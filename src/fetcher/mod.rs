//! Fetcher module for bulk record retrieval
//!
//! This module contains the core harvesting logic, including:
//! - The HTTP transport issuing one request per identifier
//! - Classification of transport results into outcomes
//! - The shared identifier range consumed by the worker pool
//! - Overall run coordination

mod classifier;
mod controller;
mod range;
mod transport;

pub use classifier::{classify, FetchOutcome, UNKNOWN_CONTENT_TYPE};
pub use controller::{Progress, RunController, RunReport, RunSettings, ABANDONED_MESSAGE};
pub use range::IdRange;
pub use transport::{
    build_http_client, HttpTransport, RawResponse, Transport, TransportError, TransportResult,
};

use crate::config::Config;
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration and create the output directory
/// 2. Build the HTTP client and open the record sink
/// 3. Fetch every identifier in the range with the worker pool
/// 4. Write the JSON summary
///
/// # Example
///
/// ```no_run
/// use crm_harvest::config::load_config;
/// use crm_harvest::fetcher::harvest;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = harvest(&config, CancellationToken::new()).await?;
/// println!("{} records fetched", report.statistics.successful);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config, cancel: CancellationToken) -> Result<RunReport> {
    let mut controller = RunController::from_config(config)?;
    controller.run(cancel).await
}
