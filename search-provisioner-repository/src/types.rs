//! Result types for provisioning and document operations.

use std::fmt;

/// Kind of remote resource managed by the provisioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    DataSource,
    Index,
    Indexer,
}

impl ResourceKind {
    /// Collection segment of the REST path for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "datasources",
            ResourceKind::Index => "indexes",
            ResourceKind::Indexer => "indexers",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::DataSource => "data source",
            ResourceKind::Index => "index",
            ResourceKind::Indexer => "indexer",
        };
        f.write_str(name)
    }
}

/// Outcome of a create or delete call.
///
/// "Already exists" on create and "not found" on delete are expected and
/// benign. Any other non-success status is carried as `Unexpected` so the
/// caller can decide whether to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
    Deleted,
    NotFound,
    Unexpected { status: u16, body: String },
}

impl ProvisionOutcome {
    /// True for every outcome except `Unexpected`.
    pub fn is_ok(&self) -> bool {
        !matches!(self, ProvisionOutcome::Unexpected { .. })
    }

    pub fn is_unexpected(&self) -> bool {
        !self.is_ok()
    }
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionOutcome::Created => f.write_str("created"),
            ProvisionOutcome::AlreadyExists => f.write_str("already exists"),
            ProvisionOutcome::Deleted => f.write_str("deleted"),
            ProvisionOutcome::NotFound => f.write_str("not found"),
            ProvisionOutcome::Unexpected { status, .. } => {
                write!(f, "unexpected status {}", status)
            }
        }
    }
}

/// Outcome of triggering an indexer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The service accepted the run (202).
    Accepted,
    Unexpected { status: u16, body: String },
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RunOutcome::Accepted)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Accepted => f.write_str("accepted"),
            RunOutcome::Unexpected { status, body } if body.is_empty() => {
                write!(f, "not accepted (status {})", status)
            }
            RunOutcome::Unexpected { status, body } => {
                write!(f, "not accepted (status {}): {}", status, body)
            }
        }
    }
}

/// Result of indexing a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOperationResult {
    /// Value of the document's key field.
    pub key: String,
    pub success: bool,
    pub error: Option<String>,
}

impl BatchOperationResult {
    pub fn success(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Summary of an upload, aggregated across batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOperationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total,
            succeeded,
            failed: total - succeeded,
            results,
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
