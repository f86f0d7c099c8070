//! Orchestrator module for the search provisioner.
//!
//! Creates the remote resources in dependency order (data source, index,
//! indexer), runs the indexer, reports the document count, and tears the
//! resources down in reverse order.

use std::fmt;
use std::str::FromStr;

use tracing::{info, instrument, warn};

use crate::builder::ResourceDescriptors;
use crate::errors::OrchestratorError;
use crate::poller::{JobOutcome, JobPoller, PollConfig};
use search_provisioner_repository::{
    ProvisionOutcome, ProvisioningService, ResourceKind, RunOutcome, SearchServiceError,
};

/// What to do when a step gets an unexpected status or a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and carry on with the next step.
    #[default]
    Continue,
    /// Stop at the first failure with `OrchestratorError::Aborted`.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(FailurePolicy::Continue),
            "abort" | "fail-fast" | "fail_fast" => Ok(FailurePolicy::Abort),
            other => Err(format!(
                "unknown failure policy '{}', expected continue or abort",
                other
            )),
        }
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub failure_policy: FailurePolicy,
    pub poll: PollConfig,
}

/// Result of one create or delete step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub kind: ResourceKind,
    pub name: String,
    pub result: Result<ProvisionOutcome, SearchServiceError>,
}

impl StepReport {
    /// True when the step got an expected answer (including "already exists"
    /// and "not found").
    pub fn is_ok(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_ok())
    }

    fn failure_reason(&self) -> Option<String> {
        match &self.result {
            Ok(ProvisionOutcome::Unexpected { status, body }) => {
                Some(format!("unexpected status {}: {}", status, body))
            }
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(outcome) => write!(f, "{} '{}': {}", self.kind, self.name, outcome),
            Err(e) => write!(f, "{} '{}': error: {}", self.kind, self.name, e),
        }
    }
}

/// Summary of a provisioning run.
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    /// Create steps in the order they ran.
    pub steps: Vec<StepReport>,
    /// `None` when the run was never triggered.
    pub run: Option<RunOutcome>,
    /// `None` when the run was not accepted or could not be followed.
    pub job: Option<JobOutcome>,
    /// Transport or status error while triggering or polling the run.
    pub job_error: Option<SearchServiceError>,
    /// `None` when counting failed.
    pub document_count: Option<u64>,
}

impl ProvisionReport {
    /// All resources exist and the indexer run succeeded.
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(StepReport::is_ok)
            && matches!(self.run, Some(RunOutcome::Accepted))
            && self.job.as_ref().is_some_and(JobOutcome::is_success)
            && self.job_error.is_none()
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        match &self.run {
            Some(run) => writeln!(f, "indexer run: {}", run)?,
            None => writeln!(f, "indexer run: not triggered")?,
        }
        if let Some(job) = &self.job {
            writeln!(f, "indexer job: {}", job)?;
        }
        if let Some(e) = &self.job_error {
            writeln!(f, "indexer job: error: {}", e)?;
        }
        match self.document_count {
            Some(count) => write!(f, "documents in index: {}", count),
            None => write!(f, "documents in index: unknown"),
        }
    }
}

/// Summary of a teardown.
#[derive(Debug, Clone, Default)]
pub struct TeardownReport {
    /// Delete steps: indexer, index, data source.
    pub steps: Vec<StepReport>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(StepReport::is_ok)
    }
}

impl fmt::Display for TeardownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Orchestrator that drives provisioning and teardown of one corpus.
///
/// The orchestrator:
/// - Creates data source, index and indexer in that order
/// - Triggers the indexer and polls the run to completion
/// - Counts the documents in the index
/// - Deletes the resources in reverse order
///
/// Every remote call is awaited in sequence.
pub struct Orchestrator {
    service: ProvisioningService,
    poller: JobPoller,
    descriptors: ResourceDescriptors,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration.
    pub fn new(service: ProvisioningService, descriptors: ResourceDescriptors) -> Self {
        Self::with_config(service, descriptors, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        service: ProvisioningService,
        descriptors: ResourceDescriptors,
        config: OrchestratorConfig,
    ) -> Self {
        let poller = JobPoller::new(service.clone(), config.poll);

        Self {
            service,
            poller,
            descriptors,
            config,
        }
    }

    pub fn descriptors(&self) -> &ResourceDescriptors {
        &self.descriptors
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Record a step, or stop if the policy says so.
    fn check_step(&self, step: StepReport) -> Result<StepReport, OrchestratorError> {
        if let Some(reason) = step.failure_reason() {
            warn!(kind = %step.kind, name = %step.name, reason = %reason, "Provisioning step failed");
            if self.config.failure_policy == FailurePolicy::Abort {
                return Err(OrchestratorError::aborted(step.kind, &step.name, reason));
            }
        }
        Ok(step)
    }

    /// Create the data source, index and indexer.
    ///
    /// "Already exists" answers count as success, so running this twice is
    /// harmless.
    #[instrument(skip(self))]
    pub async fn create_resources(&self) -> Result<Vec<StepReport>, OrchestratorError> {
        let ds = &self.descriptors.data_source;
        let index = &self.descriptors.index;
        let indexer = &self.descriptors.indexer;

        let mut steps = Vec::with_capacity(3);
        steps.push(self.check_step(StepReport {
            kind: ResourceKind::DataSource,
            name: ds.name.clone(),
            result: self.service.create_data_source(ds).await,
        })?);
        steps.push(self.check_step(StepReport {
            kind: ResourceKind::Index,
            name: index.name.clone(),
            result: self.service.create_index(index).await,
        })?);
        steps.push(self.check_step(StepReport {
            kind: ResourceKind::Indexer,
            name: indexer.name.clone(),
            result: self.service.create_indexer(indexer).await,
        })?);

        Ok(steps)
    }

    /// Run the whole provisioning sequence.
    ///
    /// Creates the resources, runs the indexer, polls the run and counts the
    /// documents. A run that is not accepted is not polled, but the count is
    /// still attempted.
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionReport)` - Outcome of every step
    /// * `Err(OrchestratorError::Aborted)` - First failure under `FailurePolicy::Abort`
    #[instrument(skip(self), fields(index = %self.descriptors.index.name))]
    pub async fn provision(&self) -> Result<ProvisionReport, OrchestratorError> {
        info!("Starting provisioning");

        let mut report = ProvisionReport {
            steps: self.create_resources().await?,
            ..Default::default()
        };

        let indexer = &self.descriptors.indexer.name;
        match self.poller.run_indexer(indexer).await {
            Ok(RunOutcome::Accepted) => {
                report.run = Some(RunOutcome::Accepted);
                match self.poller.poll_until_terminal(indexer).await {
                    Ok(job) => report.job = Some(job),
                    Err(e) => {
                        warn!(indexer = %indexer, error = %e, "Failed to poll indexer run");
                        if self.config.failure_policy == FailurePolicy::Abort {
                            return Err(OrchestratorError::aborted(
                                ResourceKind::Indexer,
                                indexer,
                                e.to_string(),
                            ));
                        }
                        report.job_error = Some(e);
                    }
                }
            }
            Ok(unexpected) => {
                if self.config.failure_policy == FailurePolicy::Abort {
                    return Err(OrchestratorError::aborted(
                        ResourceKind::Indexer,
                        indexer,
                        "indexer run was not accepted",
                    ));
                }
                report.run = Some(unexpected);
            }
            Err(e) => {
                warn!(indexer = %indexer, error = %e, "Failed to trigger indexer run");
                if self.config.failure_policy == FailurePolicy::Abort {
                    return Err(OrchestratorError::aborted(
                        ResourceKind::Indexer,
                        indexer,
                        e.to_string(),
                    ));
                }
                report.job_error = Some(e);
            }
        }

        let index = &self.descriptors.index.name;
        match self.service.count_documents(index).await {
            Ok(count) => {
                info!(index = %index, count = count, "Documents in index");
                report.document_count = Some(count);
            }
            Err(e) => {
                warn!(index = %index, error = %e, "Failed to count documents");
                if self.config.failure_policy == FailurePolicy::Abort {
                    return Err(OrchestratorError::aborted(
                        ResourceKind::Index,
                        index,
                        e.to_string(),
                    ));
                }
            }
        }

        info!(success = report.is_success(), "Provisioning finished");
        Ok(report)
    }

    /// Delete indexer, index and data source, in that order.
    ///
    /// Missing resources are reported as `NotFound` and do not stop the
    /// teardown.
    #[instrument(skip(self))]
    pub async fn teardown_all(&self) -> Result<TeardownReport, OrchestratorError> {
        info!("Starting teardown");

        let indexer = &self.descriptors.indexer.name;
        let index = &self.descriptors.index.name;
        let ds = &self.descriptors.data_source.name;

        let mut report = TeardownReport::default();
        report.steps.push(self.check_step(StepReport {
            kind: ResourceKind::Indexer,
            name: indexer.clone(),
            result: self.service.delete_indexer(indexer).await,
        })?);
        report.steps.push(self.check_step(StepReport {
            kind: ResourceKind::Index,
            name: index.clone(),
            result: self.service.delete_index(index).await,
        })?);
        report.steps.push(self.check_step(StepReport {
            kind: ResourceKind::DataSource,
            name: ds.clone(),
            result: self.service.delete_data_source(ds).await,
        })?);

        info!(clean = report.is_clean(), "Teardown finished");
        Ok(report)
    }

    /// Tear everything down, then provision from scratch.
    pub async fn reset_and_provision(
        &self,
    ) -> Result<(TeardownReport, ProvisionReport), OrchestratorError> {
        let teardown = self.teardown_all().await?;
        let provision = self.provision().await?;
        Ok((teardown, provision))
    }

    /// Trigger a graceful shutdown of an in-flight poll.
    pub fn shutdown(&self) {
        self.poller.shutdown();
    }
}
