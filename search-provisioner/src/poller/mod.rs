//! Indexer job runner and poller.
//!
//! Triggers an indexer run and polls its status at a fixed interval until the
//! run reaches a terminal status, the optional timeout elapses, or a shutdown
//! is requested.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::SecondsFormat;
use tokio::sync::broadcast;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

use search_provisioner_repository::{ProvisioningService, RunOutcome, SearchServiceError};
use search_provisioner_shared::{IndexerExecution, IndexerStatusResponse, JobStatus};

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait between two status polls.
    pub interval: Duration,
    /// Wait before the first poll, giving the service time to start the run.
    pub initial_delay: Duration,
    /// Give up after this long. `None` polls until a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl PollConfig {
    /// Poll every `interval`, waiting one interval before the first poll.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            initial_delay: interval,
            timeout: None,
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// How a polled indexer run ended.
///
/// A failed run is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Succeeded {
        polls: u32,
        execution: IndexerExecution,
    },
    Failed {
        polls: u32,
        status: JobStatus,
        error_message: Option<String>,
    },
    TimedOut {
        polls: u32,
    },
    Cancelled {
        polls: u32,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    /// Number of status polls performed.
    pub fn polls(&self) -> u32 {
        match self {
            JobOutcome::Succeeded { polls, .. }
            | JobOutcome::Failed { polls, .. }
            | JobOutcome::TimedOut { polls }
            | JobOutcome::Cancelled { polls } => *polls,
        }
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Succeeded { polls, execution } => write!(
                f,
                "succeeded after {} polls ({} items processed, {} failed)",
                polls, execution.items_processed, execution.items_failed
            ),
            JobOutcome::Failed {
                polls,
                status,
                error_message,
            } => write!(
                f,
                "failed with status {} after {} polls: {}",
                status,
                polls,
                error_message.as_deref().unwrap_or("no error message")
            ),
            JobOutcome::TimedOut { polls } => write!(f, "timed out after {} polls", polls),
            JobOutcome::Cancelled { polls } => write!(f, "cancelled after {} polls", polls),
        }
    }
}

/// Describe an indexer status and its latest run as text.
pub fn describe_status(name: &str, response: &IndexerStatusResponse) -> String {
    let mut out = format!("indexer '{}': {}", name, response.status);
    let Some(last) = &response.last_result else {
        out.push_str("\nlast run: none");
        return out;
    };

    let _ = write!(out, "\nlast run: {}", last.status);
    if let Some(start) = last.start_time {
        let _ = write!(
            out,
            "\n  started:  {}",
            start.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    if let Some(end) = last.end_time {
        let _ = write!(
            out,
            "\n  finished: {}",
            end.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    let _ = write!(
        out,
        "\n  items: {} processed, {} failed",
        last.items_processed, last.items_failed
    );
    if let Some(message) = &last.error_message {
        let _ = write!(out, "\n  error: {}", message);
    }
    out
}

/// Resolves at the deadline, or never when there is none.
async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Runs an indexer and waits for the run to finish.
pub struct JobPoller {
    service: ProvisioningService,
    config: PollConfig,
    shutdown_tx: broadcast::Sender<()>,
    stopped: AtomicBool,
}

impl JobPoller {
    pub fn new(service: ProvisioningService, config: PollConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            service,
            config,
            shutdown_tx,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Trigger a run of the indexer.
    ///
    /// A run that is not accepted is logged by the provider and returned as
    /// `RunOutcome::Unexpected`.
    pub async fn run_indexer(&self, name: &str) -> Result<RunOutcome, SearchServiceError> {
        self.service.run_indexer(name).await
    }

    /// Poll the indexer status until its latest run is terminal or the poller
    /// is shut down.
    ///
    /// Waits `initial_delay`, then polls; while the run is queued or in
    /// progress it waits `interval` and polls again. N in-progress answers
    /// followed by a terminal one take N + 1 polls.
    ///
    /// # Returns
    ///
    /// * `Ok(JobOutcome)` - Terminal status, timeout or cancellation
    /// * `Err(SearchServiceError)` - If a status request fails
    #[instrument(skip(self), fields(interval_secs = self.config.interval.as_secs()))]
    pub async fn poll_until_terminal(&self, name: &str) -> Result<JobOutcome, SearchServiceError> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut wait = self.config.initial_delay;
        let mut polls: u32 = 0;

        if self.stopped.load(Ordering::SeqCst) {
            info!(indexer = %name, "Poller already shut down");
            return Ok(JobOutcome::Cancelled { polls });
        }

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!(indexer = %name, polls = polls, "Polling cancelled");
                    return Ok(JobOutcome::Cancelled { polls });
                }
                _ = wait_for_deadline(deadline) => {
                    warn!(indexer = %name, polls = polls, "Timed out waiting for indexer run");
                    return Ok(JobOutcome::TimedOut { polls });
                }
                _ = sleep(wait) => {}
            }

            let response = self.service.indexer_status(name).await?;
            polls += 1;
            let status = response.job_status();

            if !status.is_terminal() {
                debug!(indexer = %name, status = %status, polls = polls, "Indexer run not finished");
                wait = self.config.interval;
                continue;
            }

            let execution = response
                .last_result
                .unwrap_or_else(|| IndexerExecution::with_status(status));

            if status.is_success() {
                let elapsed = match (execution.start_time, execution.end_time) {
                    (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
                    _ => None,
                };
                info!(
                    indexer = %name,
                    polls = polls,
                    items_processed = execution.items_processed,
                    items_failed = execution.items_failed,
                    elapsed_ms = ?elapsed,
                    "Indexer run succeeded"
                );
                return Ok(JobOutcome::Succeeded { polls, execution });
            }

            warn!(
                indexer = %name,
                status = %status,
                polls = polls,
                error = ?execution.error_message,
                "Indexer run failed"
            );
            return Ok(JobOutcome::Failed {
                polls,
                status,
                error_message: execution.error_message,
            });
        }
    }

    /// Trigger a run and wait for it. A run that is not accepted is not polled.
    pub async fn run_and_wait(
        &self,
        name: &str,
    ) -> Result<(RunOutcome, Option<JobOutcome>), SearchServiceError> {
        let run = self.run_indexer(name).await?;
        if !run.is_accepted() {
            return Ok((run, None));
        }
        let outcome = self.poll_until_terminal(name).await?;
        Ok((run, Some(outcome)))
    }

    /// Stop an in-flight poll, and any later one. The poll returns
    /// `JobOutcome::Cancelled`.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }
}
