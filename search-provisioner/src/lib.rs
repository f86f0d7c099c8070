//! # Search Provisioner
//!
//! Provisions a managed cloud search service and drives its indexer.
//!
//! ## Architecture
//!
//! 1. **Builder**: Builds data source, index and indexer descriptors from a corpus
//! 2. **Orchestrator**: Creates the resources in dependency order and tears them down
//! 3. **Poller**: Triggers an indexer run and polls it to a terminal status
//! 4. **Loader**: Uploads documents from a JSON file in batches
//! 5. **Query**: Runs a search and renders the hits as text
//!
//! ## Modules
//!
//! - [`config`]: Corpus presets, environment configuration and dependency wiring
//! - [`builder`]: Resource descriptor builder
//! - [`orchestrator`]: Provisioning sequence and teardown
//! - [`poller`]: Indexer run and poll loop
//! - [`loader`]: Document upload
//! - [`query`]: Query façade and result rendering
//! - [`errors`]: Error types for the workflow

pub mod builder;
pub mod config;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod poller;
pub mod query;

pub use config::{Corpus, CorpusConfig, Dependencies, ProvisionerConfig};
pub use errors::OrchestratorError;

use thiserror::Error;

/// Errors that can occur during startup or execution of a command.
#[derive(Error, Debug)]
pub enum ProvisionerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Orchestrator error.
    #[error("Orchestrator error: {0}")]
    OrchestratorError(#[from] OrchestratorError),

    /// The command ran but did not reach its goal.
    #[error("Command failed: {0}")]
    Failed(String),
}

impl ProvisionerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a command failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
