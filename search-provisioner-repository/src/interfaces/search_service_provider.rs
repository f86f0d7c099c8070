//! Search service provider trait definition.
//!
//! This module defines the abstract interface over the remote search service.
//! Implementations handle the wire protocol; `ProvisioningService` adds
//! validation on top.

use async_trait::async_trait;
use search_provisioner_shared::{
    DataSourceDescriptor, IndexDescriptor, IndexerDescriptor, IndexerStatusResponse,
    SearchRequest, SearchResponse,
};
use serde_json::Value;

use crate::errors::SearchServiceError;
use crate::types::{BatchOperationSummary, ProvisionOutcome, ResourceKind, RunOutcome};

/// Abstract interface for the managed search service.
///
/// Create and delete calls return a `ProvisionOutcome` for every HTTP answer,
/// including conflicts and missing resources. `Err` is reserved for transport
/// and parse failures.
#[async_trait]
pub trait SearchServiceProvider: Send + Sync {
    /// Create a data source.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - The data source definition
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionOutcome)` - `Created`, `AlreadyExists` or `Unexpected`
    /// * `Err(SearchServiceError)` - If the request could not be completed
    async fn create_data_source(
        &self,
        descriptor: &DataSourceDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError>;

    /// Create an index.
    async fn create_index(
        &self,
        descriptor: &IndexDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError>;

    /// Create an indexer. The referenced data source and index should exist.
    async fn create_indexer(
        &self,
        descriptor: &IndexerDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError>;

    /// Delete a resource by kind and name.
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionOutcome)` - `Deleted`, `NotFound` or `Unexpected`
    /// * `Err(SearchServiceError)` - If the request could not be completed
    async fn delete_resource(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<ProvisionOutcome, SearchServiceError>;

    /// Trigger a run of the named indexer.
    async fn run_indexer(&self, name: &str) -> Result<RunOutcome, SearchServiceError>;

    /// Fetch the current status of the named indexer.
    async fn indexer_status(&self, name: &str) -> Result<IndexerStatusResponse, SearchServiceError>;

    /// Number of documents currently in the index.
    async fn count_documents(&self, index: &str) -> Result<u64, SearchServiceError>;

    /// Execute a query against an index.
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchServiceError>;

    /// Upload one batch of documents with the `upload` action.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `documents` - JSON objects matching the index schema
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document results
    /// * `Err(SearchServiceError)` - If the request failed as a whole
    async fn upload_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BatchOperationSummary, SearchServiceError>;
}
