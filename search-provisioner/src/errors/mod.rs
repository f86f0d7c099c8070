//! Error types for the provisioning workflow.

use search_provisioner_repository::{ResourceKind, SearchServiceError};
use thiserror::Error;

/// Errors that can occur while provisioning, running or tearing down.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A step failed under the abort failure policy.
    #[error("Aborted at {step}: {reason}")]
    Aborted { step: String, reason: String },

    /// Error from the search service that is not absorbed by the workflow.
    #[error("Search service error: {0}")]
    Service(#[from] SearchServiceError),

    /// Error reading or uploading a document file.
    #[error("Loader error: {0}")]
    LoaderError(String),
}

impl OrchestratorError {
    /// Create an aborted error for a step on a named resource.
    pub fn aborted(kind: ResourceKind, name: &str, reason: impl Into<String>) -> Self {
        Self::Aborted {
            step: format!("{} '{}'", kind, name),
            reason: reason.into(),
        }
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}
