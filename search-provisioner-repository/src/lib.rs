//! # Search Provisioner Repository
//!
//! This crate provides the interface and implementation for talking to the
//! managed search service. It includes the error type, the
//! `SearchServiceProvider` trait, a REST implementation for Azure Cognitive
//! Search, and the validating `ProvisioningService` used by application code.

pub mod azure;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod service;
pub mod types;
pub mod utils;

pub use azure::{AzureSearchProvider, Endpoints};
pub use config::{ConnectionConfig, ProvisioningServiceConfig};
pub use errors::SearchServiceError;
pub use interfaces::SearchServiceProvider;
pub use service::ProvisioningService;
pub use types::{
    BatchOperationResult, BatchOperationSummary, ProvisionOutcome, ResourceKind, RunOutcome,
};
pub use utils::{parse_document_count, validate_resource_name};
