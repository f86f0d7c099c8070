//! Azure Cognitive Search implementation of the search service provider.
//!
//! This module provides a concrete implementation of `SearchServiceProvider`
//! over the service's REST API.

mod endpoints;
mod provider;

pub use endpoints::Endpoints;
pub use provider::{classify_create, classify_delete, classify_run, AzureSearchProvider};
