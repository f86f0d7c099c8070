//! Provisioning service implementation.
//!
//! This module provides the main service for managing remote search resources.
//! Application code uses this to create and delete data sources, indexes and
//! indexers, to run indexers, and to query and load documents.

use std::collections::HashSet;
use std::sync::Arc;

use search_provisioner_shared::{
    DataSourceDescriptor, FieldType, IndexDescriptor, IndexerDescriptor, IndexerStatusResponse,
    SearchRequest, SearchResponse,
};
use serde_json::Value;

use crate::config::ProvisioningServiceConfig;
use crate::errors::SearchServiceError;
use crate::interfaces::SearchServiceProvider;
use crate::types::{BatchOperationSummary, ProvisionOutcome, ResourceKind, RunOutcome};
use crate::utils::validate_resource_name;

/// The main service for interacting with the search service.
///
/// This is the high-level API that application code should use. It validates
/// descriptors and requests and delegates to a `SearchServiceProvider` for the
/// remote calls. Invalid input is rejected with
/// `SearchServiceError::ValidationError` before any request is sent.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_provisioner_repository::{AzureSearchProvider, ConnectionConfig, ProvisioningService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConnectionConfig::new("https://acme.search.windows.net", "admin-key");
/// let provider = Arc::new(AzureSearchProvider::new(&config)?);
/// let service = ProvisioningService::new(provider);
///
/// let outcome = service.delete_index("covid-19-index").await?;
/// println!("{}", outcome);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProvisioningService {
    provider: Arc<dyn SearchServiceProvider>,
    config: ProvisioningServiceConfig,
}

impl ProvisioningService {
    /// Create a new service with default configuration.
    ///
    /// The default configuration includes a batch size limit of 1000 documents.
    pub fn new(provider: Arc<dyn SearchServiceProvider>) -> Self {
        Self {
            provider,
            config: ProvisioningServiceConfig::default(),
        }
    }

    /// Create a new service with custom configuration.
    pub fn with_config(
        provider: Arc<dyn SearchServiceProvider>,
        config: ProvisioningServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// Maximum number of documents accepted by one `upload_documents` call.
    pub fn max_batch_size(&self) -> Option<usize> {
        self.config.max_batch_size
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchServiceError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchServiceError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Validate a data source descriptor.
    pub fn validate_data_source(descriptor: &DataSourceDescriptor) -> Result<(), SearchServiceError> {
        validate_resource_name("data source", &descriptor.name)?;
        if descriptor.credentials.connection_string.trim().is_empty() {
            return Err(SearchServiceError::validation(format!(
                "data source '{}' has an empty connection string",
                descriptor.name
            )));
        }
        if descriptor.container.name.trim().is_empty() {
            return Err(SearchServiceError::validation(format!(
                "data source '{}' has an empty container name",
                descriptor.name
            )));
        }
        Ok(())
    }

    /// Validate an index descriptor.
    ///
    /// The index must have at least one field, unique field names, and
    /// exactly one key field of type `Edm.String`.
    pub fn validate_index(descriptor: &IndexDescriptor) -> Result<(), SearchServiceError> {
        validate_resource_name("index", &descriptor.name)?;

        if descriptor.fields.is_empty() {
            return Err(SearchServiceError::validation(format!(
                "index '{}' has no fields",
                descriptor.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &descriptor.fields {
            if field.name.trim().is_empty() {
                return Err(SearchServiceError::validation(format!(
                    "index '{}' has a field with an empty name",
                    descriptor.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SearchServiceError::validation(format!(
                    "index '{}' has duplicate field '{}'",
                    descriptor.name, field.name
                )));
            }
        }

        let keys = descriptor.key_fields();
        match keys.as_slice() {
            [key] if key.field_type == FieldType::String => Ok(()),
            [key] => Err(SearchServiceError::validation(format!(
                "key field '{}' of index '{}' must be Edm.String",
                key.name, descriptor.name
            ))),
            _ => Err(SearchServiceError::validation(format!(
                "index '{}' must have exactly one key field, found {}",
                descriptor.name,
                keys.len()
            ))),
        }
    }

    /// Validate an indexer descriptor.
    pub fn validate_indexer(descriptor: &IndexerDescriptor) -> Result<(), SearchServiceError> {
        validate_resource_name("indexer", &descriptor.name)?;
        validate_resource_name("data source", &descriptor.data_source_name)?;
        validate_resource_name("index", &descriptor.target_index_name)?;
        Ok(())
    }

    /// Create a data source.
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionOutcome)` - `Created`, `AlreadyExists` or `Unexpected`
    /// * `Err(SearchServiceError::ValidationError)` - If the descriptor is invalid
    /// * `Err(SearchServiceError)` - If the request fails
    pub async fn create_data_source(
        &self,
        descriptor: &DataSourceDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        Self::validate_data_source(descriptor)?;
        self.provider.create_data_source(descriptor).await
    }

    /// Create an index.
    pub async fn create_index(
        &self,
        descriptor: &IndexDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        Self::validate_index(descriptor)?;
        self.provider.create_index(descriptor).await
    }

    /// Create an indexer.
    pub async fn create_indexer(
        &self,
        descriptor: &IndexerDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        Self::validate_indexer(descriptor)?;
        self.provider.create_indexer(descriptor).await
    }

    /// Delete a data source. A missing data source yields `NotFound`.
    pub async fn delete_data_source(&self, name: &str) -> Result<ProvisionOutcome, SearchServiceError> {
        self.delete(ResourceKind::DataSource, name).await
    }

    /// Delete an index. A missing index yields `NotFound`.
    pub async fn delete_index(&self, name: &str) -> Result<ProvisionOutcome, SearchServiceError> {
        self.delete(ResourceKind::Index, name).await
    }

    /// Delete an indexer. A missing indexer yields `NotFound`.
    pub async fn delete_indexer(&self, name: &str) -> Result<ProvisionOutcome, SearchServiceError> {
        self.delete(ResourceKind::Indexer, name).await
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        validate_resource_name(&kind.to_string(), name)?;
        self.provider.delete_resource(kind, name).await
    }

    /// Trigger a run of an indexer.
    pub async fn run_indexer(&self, name: &str) -> Result<RunOutcome, SearchServiceError> {
        validate_resource_name("indexer", name)?;
        self.provider.run_indexer(name).await
    }

    /// Fetch the status of an indexer and its most recent run.
    pub async fn indexer_status(
        &self,
        name: &str,
    ) -> Result<IndexerStatusResponse, SearchServiceError> {
        validate_resource_name("indexer", name)?;
        self.provider.indexer_status(name).await
    }

    /// Number of documents in an index.
    pub async fn count_documents(&self, index: &str) -> Result<u64, SearchServiceError> {
        validate_resource_name("index", index)?;
        self.provider.count_documents(index).await
    }

    /// Execute a query against an index.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Ordered hits and the total match count
    /// * `Err(SearchServiceError::ValidationError)` - If the query text is blank
    /// * `Err(SearchServiceError)` - If the request fails
    pub async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchServiceError> {
        validate_resource_name("index", index)?;
        if request.is_blank() {
            return Err(SearchServiceError::validation("search text cannot be empty"));
        }
        self.provider.search(index, request).await
    }

    /// Upload one batch of documents.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document results
    /// * `Err(SearchServiceError::BatchSizeExceeded)` - If the batch is over the limit
    /// * `Err(SearchServiceError)` - If the request fails
    pub async fn upload_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BatchOperationSummary, SearchServiceError> {
        validate_resource_name("index", index)?;
        self.validate_batch_size(documents.len())?;
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }
        self.provider.upload_documents(index, documents).await
    }
}
