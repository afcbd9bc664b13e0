//! Run controller - main harvest orchestration logic
//!
//! This module contains the fetch-classify-persist loop:
//! - A bounded pool of workers pulling identifiers from a shared range
//! - Classification of every attempt into a [`FetchOutcome`]
//! - Persistence of successful payloads through the record sink
//! - A single accumulator owning the counters and the error ledger
//! - Cancellation with a grace period for in-flight requests
//! - Exactly one summary write per run

use crate::config::{validate, Config};
use crate::fetcher::classifier::{classify, FetchOutcome};
use crate::fetcher::range::IdRange;
use crate::fetcher::transport::{HttpTransport, Transport};
use crate::output::SummaryWriter;
use crate::state::{RunState, RunStatistics};
use crate::storage::{open_sink, Record, RecordSink};
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Ledger message for a request still pending when the grace period ran out
pub const ABANDONED_MESSAGE: &str = "Request abandoned on interruption";

/// Parameters of one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub start: u64,
    pub end: u64,
    pub timeout: Duration,
    pub delay: Duration,
    pub concurrency: usize,
    pub grace_period: Duration,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start: config.range.start,
            end: config.range.end,
            timeout: config.fetch.timeout(),
            delay: config.fetch.delay(),
            concurrency: config.fetch.concurrency.max(1) as usize,
            grace_period: config.fetch.grace_period(),
        }
    }
}

/// Snapshot published after every recorded attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Identifier of the most recently recorded attempt
    pub current_id: Option<u64>,
    pub completed: u64,
    pub successful: u64,
    pub failed: u64,
    pub total: u64,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    pub statistics: RunStatistics,
    pub elapsed: Duration,
    pub summary_path: PathBuf,
}

/// Message sent from a worker to the accumulator
#[derive(Debug)]
struct Attempt {
    id: u64,
    result: AttemptResult,
}

#[derive(Debug)]
enum AttemptResult {
    Success { persist_failed: bool },
    Failure(String),
}

/// Main harvest controller
pub struct RunController {
    settings: RunSettings,
    transport: Arc<dyn Transport>,
    sink: Option<Arc<dyn RecordSink>>,
    summary: SummaryWriter,
    progress: watch::Sender<Progress>,
    force_stop: CancellationToken,
    state: RunState,
}

impl RunController {
    /// Creates a controller from its collaborators
    ///
    /// Passing `None` as the sink disables individual record persistence;
    /// successes are then only counted.
    pub fn new(
        settings: RunSettings,
        transport: Arc<dyn Transport>,
        sink: Option<Arc<dyn RecordSink>>,
        summary: SummaryWriter,
    ) -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            settings,
            transport,
            sink,
            summary,
            progress,
            force_stop: CancellationToken::new(),
            state: RunState::NotStarted,
        }
    }

    /// Builds a controller wired to the HTTP transport and configured sink
    ///
    /// # Returns
    ///
    /// * `Ok(RunController)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration, the output directory
    ///   could not be created, or the sink/client could not be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;

        let directory = Path::new(&config.output.directory);
        std::fs::create_dir_all(directory).map_err(|source| HarvestError::OutputDir {
            path: directory.to_path_buf(),
            source,
        })?;

        let transport = Arc::new(HttpTransport::new(&config.fetch)?);
        let sink = open_sink(&config.output)?;
        if let Some(sink) = &sink {
            tracing::info!("Persisting records to {}", sink.describe());
        } else {
            tracing::info!("Individual record saving disabled");
        }

        Ok(Self::new(
            RunSettings::from_config(config),
            transport,
            sink,
            SummaryWriter::new(config.output.summary_path()),
        ))
    }

    /// Subscribes to live progress
    ///
    /// Publishing never blocks, and a dropped receiver never affects the run.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Token that ends the grace period of an interrupted run early
    ///
    /// Cancelling it only has an effect once the run's cancellation token
    /// fired; requests still in flight are then abandoned immediately.
    pub fn force_stop_token(&self) -> CancellationToken {
        self.force_stop.clone()
    }

    fn transition(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Run state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Attempts every identifier in the range and writes the summary
    ///
    /// Cancelling `cancel` stops dispatch; in-flight requests get the grace
    /// period to finish before being abandoned. The summary is written once,
    /// whether the run completed or was interrupted.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<RunReport> {
        let RunSettings { start, end, .. } = self.settings;
        if start > end {
            return Err(HarvestError::InvalidRange { start, end });
        }
        self.transition(RunState::Running)?;

        let started = Instant::now();
        let range = Arc::new(IdRange::new(start, end));
        let total = range.total();
        let concurrency = self.settings.concurrency.max(1);

        tracing::info!(
            "Starting harvest of ids {}..={} ({} records) with {} worker(s)",
            start,
            end,
            total,
            concurrency
        );

        let (tx, mut rx) = mpsc::channel::<Attempt>(concurrency * 2);
        let mut workers = JoinSet::new();
        for worker_id in 0..concurrency {
            let worker = Worker {
                worker_id,
                range: Arc::clone(&range),
                transport: Arc::clone(&self.transport),
                sink: self.sink.clone(),
                tx: tx.clone(),
                cancel: cancel.clone(),
                timeout: self.settings.timeout,
                delay: self.settings.delay,
                grace_period: self.settings.grace_period,
                force_stop: self.force_stop.clone(),
            };
            workers.spawn(worker.run());
        }
        drop(tx);

        let mut stats = RunStatistics::new(start, end);
        self.progress.send_replace(Progress {
            total,
            ..Progress::default()
        });

        while let Some(attempt) = rx.recv().await {
            match attempt.result {
                AttemptResult::Success { persist_failed } => {
                    stats.record_success();
                    if persist_failed {
                        stats.record_persist_failure();
                    }
                }
                AttemptResult::Failure(message) => {
                    tracing::debug!("Id {} failed: {}", attempt.id, message);
                    stats.record_failure(attempt.id, message);
                }
            }

            self.progress.send_replace(Progress {
                current_id: Some(attempt.id),
                completed: stats.total_attempted,
                successful: stats.successful,
                failed: stats.failed,
                total,
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let final_state = if cancel.is_cancelled() || stats.total_attempted < total {
            tracing::info!(
                "Harvest interrupted after dispatching {} of {} ids",
                range.dispatched(),
                total
            );
            RunState::Interrupted
        } else {
            RunState::Completed
        };
        self.transition(final_state)?;

        let summary_path = self.summary.write(&stats)?;
        let elapsed = started.elapsed();

        tracing::info!(
            "Harvest {}: {} successful, {} failed in {:.2?}",
            final_state,
            stats.successful,
            stats.failed,
            elapsed
        );

        Ok(RunReport {
            state: final_state,
            statistics: stats,
            elapsed,
            summary_path,
        })
    }
}

/// One member of the worker pool
struct Worker {
    worker_id: usize,
    range: Arc<IdRange>,
    transport: Arc<dyn Transport>,
    sink: Option<Arc<dyn RecordSink>>,
    tx: mpsc::Sender<Attempt>,
    cancel: CancellationToken,
    timeout: Duration,
    delay: Duration,
    grace_period: Duration,
    force_stop: CancellationToken,
}

impl Worker {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(id) = self.range.next_id() else {
                break;
            };

            let outcome = tokio::select! {
                result = self.transport.get(id, self.timeout) => classify(result),
                _ = abandon_after_grace(&self.cancel, &self.force_stop, self.grace_period) => {
                    tracing::warn!("Abandoning request for id {} after grace period", id);
                    FetchOutcome::OtherFailure {
                        message: ABANDONED_MESSAGE.to_string(),
                    }
                }
            };

            let result = self.settle(id, outcome).await;
            if self.tx.send(Attempt { id, result }).await.is_err() {
                break;
            }

            if !self.delay.is_zero() && !self.range.is_exhausted() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = self.cancel.cancelled() => break,
                }
            }
        }

        tracing::trace!("Worker {} finished", self.worker_id);
    }

    /// Persists a success if saving is enabled and reduces the outcome for the accumulator
    async fn settle(&self, id: u64, outcome: FetchOutcome) -> AttemptResult {
        match outcome {
            FetchOutcome::Success {
                payload,
                content_type,
            } => {
                let Some(sink) = &self.sink else {
                    return AttemptResult::Success {
                        persist_failed: false,
                    };
                };

                let sink = Arc::clone(sink);
                let record = Record {
                    id,
                    content_type,
                    payload,
                };
                let persist_failed =
                    match tokio::task::spawn_blocking(move || sink.store(&record)).await {
                        Ok(Ok(())) => false,
                        Ok(Err(e)) => {
                            tracing::warn!("Failed to persist record {}: {}", id, e);
                            true
                        }
                        Err(e) => {
                            tracing::error!("Persistence task for record {} failed: {}", id, e);
                            true
                        }
                    };
                AttemptResult::Success { persist_failed }
            }
            failure => AttemptResult::Failure(failure.error_message().unwrap_or_default()),
        }
    }
}

/// Resolves once `cancel` fired and the grace period elapsed or was forced short
async fn abandon_after_grace(
    cancel: &CancellationToken,
    force_stop: &CancellationToken,
    grace_period: Duration,
) {
    cancel.cancelled().await;
    tokio::select! {
        _ = tokio::time::sleep(grace_period) => {}
        _ = force_stop.cancelled() => {}
    }
}
