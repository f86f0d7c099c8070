//! Loader module for the search provisioner.
//!
//! Uploads documents from a JSON file into an index in batches.

use std::path::Path;
use tracing::{debug, instrument, warn};

use crate::errors::OrchestratorError;
use search_provisioner_repository::config::DEFAULT_MAX_BATCH_SIZE;
use search_provisioner_repository::{BatchOperationSummary, ProvisioningService};
use serde_json::Value;

/// Configuration for the document loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents sent per upload request.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Loader that uploads documents into the search index.
///
/// The loader is responsible for:
/// - Reading a JSON array of documents from disk
/// - Splitting it into batches no larger than the service accepts
/// - Aggregating the per-document results
pub struct DocumentLoader {
    service: ProvisioningService,
    config: LoaderConfig,
}

impl DocumentLoader {
    /// Create a new loader with the given service.
    pub fn new(service: ProvisioningService) -> Self {
        Self {
            service,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(service: ProvisioningService, config: LoaderConfig) -> Self {
        Self { service, config }
    }

    /// Effective batch size: the configured size, capped by the service limit.
    pub fn batch_size(&self) -> usize {
        let size = match self.service.max_batch_size() {
            Some(max) => self.config.batch_size.min(max),
            None => self.config.batch_size,
        };
        size.max(1)
    }

    /// Parse a JSON array of document objects.
    pub fn parse_documents(content: &str) -> Result<Vec<Value>, OrchestratorError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| OrchestratorError::loader(format!("Invalid JSON: {}", e)))?;

        let documents = match value {
            Value::Array(documents) => documents,
            _ => {
                return Err(OrchestratorError::loader(
                    "Expected a JSON array of documents",
                ))
            }
        };

        if let Some(position) = documents.iter().position(|d| !d.is_object()) {
            return Err(OrchestratorError::loader(format!(
                "Document at position {} is not a JSON object",
                position
            )));
        }

        Ok(documents)
    }

    /// Read documents from a JSON file.
    pub async fn read_documents(path: &Path) -> Result<Vec<Value>, OrchestratorError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            OrchestratorError::loader(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_documents(&content)
    }

    /// Upload documents to an index in batches.
    ///
    /// A failed batch stops the upload; per-document failures inside a batch
    /// are reported in the summary.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn upload(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BatchOperationSummary, OrchestratorError> {
        let mut summary = BatchOperationSummary::default();

        for (batch_number, batch) in documents.chunks(self.batch_size()).enumerate() {
            debug!(batch = batch_number, size = batch.len(), "Uploading batch");
            let batch_summary = self.service.upload_documents(index, batch).await?;

            if batch_summary.failed > 0 {
                warn!(
                    batch = batch_number,
                    failed = batch_summary.failed,
                    "Some documents failed to index"
                );
            }
            summary.merge(batch_summary);
        }

        Ok(summary)
    }

    /// Read a file and upload its documents.
    pub async fn load_file(
        &self,
        index: &str,
        path: &Path,
    ) -> Result<BatchOperationSummary, OrchestratorError> {
        let documents = Self::read_documents(path).await?;
        self.upload(index, &documents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_provisioner_repository::{
        BatchOperationResult, ProvisionOutcome, ProvisioningServiceConfig, ResourceKind,
        RunOutcome, SearchServiceError, SearchServiceProvider,
    };
    use search_provisioner_shared::{
        DataSourceDescriptor, IndexDescriptor, IndexerDescriptor, IndexerStatusResponse,
        SearchRequest, SearchResponse,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock provider that records batch sizes and fails documents without an id.
    struct MockUploadProvider {
        batches: std::sync::Mutex<Vec<usize>>,
        calls: AtomicUsize,
    }

    impl MockUploadProvider {
        fn new() -> Self {
            Self {
                batches: std::sync::Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchServiceProvider for MockUploadProvider {
        async fn create_data_source(
            &self,
            _descriptor: &DataSourceDescriptor,
        ) -> Result<ProvisionOutcome, SearchServiceError> {
            Ok(ProvisionOutcome::Created)
        }

        async fn create_index(
            &self,
            _descriptor: &IndexDescriptor,
        ) -> Result<ProvisionOutcome, SearchServiceError> {
            Ok(ProvisionOutcome::Created)
        }

        async fn create_indexer(
            &self,
            _descriptor: &IndexerDescriptor,
        ) -> Result<ProvisionOutcome, SearchServiceError> {
            Ok(ProvisionOutcome::Created)
        }

        async fn delete_resource(
            &self,
            _kind: ResourceKind,
            _name: &str,
        ) -> Result<ProvisionOutcome, SearchServiceError> {
            Ok(ProvisionOutcome::Deleted)
        }

        async fn run_indexer(&self, _name: &str) -> Result<RunOutcome, SearchServiceError> {
            Ok(RunOutcome::Accepted)
        }

        async fn indexer_status(
            &self,
            _name: &str,
        ) -> Result<IndexerStatusResponse, SearchServiceError> {
            Err(SearchServiceError::request("not used"))
        }

        async fn count_documents(&self, _index: &str) -> Result<u64, SearchServiceError> {
            Ok(0)
        }

        async fn search(
            &self,
            _index: &str,
            _request: &SearchRequest,
        ) -> Result<SearchResponse, SearchServiceError> {
            Ok(SearchResponse::empty())
        }

        async fn upload_documents(
            &self,
            _index: &str,
            documents: &[Value],
        ) -> Result<BatchOperationSummary, SearchServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(documents.len());
            let results = documents
                .iter()
                .map(|d| match d.get("HotelId").and_then(Value::as_str) {
                    Some(id) => BatchOperationResult::success(id),
                    None => BatchOperationResult::failure("", "missing key"),
                })
                .collect();
            Ok(BatchOperationSummary::from_results(results))
        }
    }

    fn hotels(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({"HotelId": i.to_string(), "HotelName": format!("Hotel {}", i)}))
            .collect()
    }

    #[tokio::test]
    async fn test_upload_splits_into_batches() {
        let provider = Arc::new(MockUploadProvider::new());
        let service = ProvisioningService::new(provider.clone());
        let loader = DocumentLoader::with_config(service, LoaderConfig { batch_size: 2 });

        let summary = loader.upload("hotels", &hotels(5)).await.unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 5);
        assert_eq!(*provider.batches.lock().unwrap(), vec![2, 2, 1]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_batch_size_capped_by_service_limit() {
        let provider = Arc::new(MockUploadProvider::new());
        let service = ProvisioningService::with_config(
            provider.clone(),
            ProvisioningServiceConfig::with_max_batch_size(3),
        );
        let loader = DocumentLoader::new(service);
        assert_eq!(loader.batch_size(), 3);

        loader.upload("hotels", &hotels(7)).await.unwrap();
        assert_eq!(*provider.batches.lock().unwrap(), vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_upload_aggregates_failures() {
        let provider = Arc::new(MockUploadProvider::new());
        let loader = DocumentLoader::new(ProvisioningService::new(provider));

        let mut documents = hotels(2);
        documents.push(json!({"HotelName": "No key"}));
        let summary = loader.upload("hotels", &documents).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
    }

    #[test]
    fn test_parse_documents() {
        let documents =
            DocumentLoader::parse_documents(r#"[{"HotelId": "1"}, {"HotelId": "2"}]"#).unwrap();
        assert_eq!(documents.len(), 2);

        assert!(DocumentLoader::parse_documents(r#"{"HotelId": "1"}"#).is_err());
        assert!(DocumentLoader::parse_documents(r#"[{"HotelId": "1"}, 3]"#).is_err());
        assert!(DocumentLoader::parse_documents("not json").is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let result = DocumentLoader::read_documents(Path::new("/nonexistent/hotels.json")).await;
        assert!(matches!(result, Err(OrchestratorError::LoaderError(_))));
    }
}
