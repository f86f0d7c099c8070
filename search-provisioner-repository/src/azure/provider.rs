//! REST provider for Azure Cognitive Search.
//!
//! This module provides the concrete implementation of `SearchServiceProvider`
//! using `reqwest` against the service's REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use search_provisioner_shared::{
    DataSourceDescriptor, IndexDescriptor, IndexerDescriptor, IndexerStatusResponse,
    SearchRequest, SearchResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::azure::endpoints::Endpoints;
use crate::config::ConnectionConfig;
use crate::errors::SearchServiceError;
use crate::interfaces::SearchServiceProvider;
use crate::types::{
    BatchOperationResult, BatchOperationSummary, ProvisionOutcome, ResourceKind, RunOutcome,
};
use crate::utils;

const API_KEY_HEADER: &str = "api-key";
const UPLOAD_ACTION: &str = "upload";

/// Classify the answer to a create request.
///
/// Conflicts are reported as `409`. Some resource kinds answer a duplicate
/// name with `400` and an "already exists" message instead.
pub fn classify_create(status: u16, body: String) -> ProvisionOutcome {
    match status {
        200 | 201 => ProvisionOutcome::Created,
        409 => ProvisionOutcome::AlreadyExists,
        400 if body.to_lowercase().contains("already exists") => ProvisionOutcome::AlreadyExists,
        _ => ProvisionOutcome::Unexpected { status, body },
    }
}

/// Classify the answer to a delete request. `404` is benign.
pub fn classify_delete(status: u16, body: String) -> ProvisionOutcome {
    match status {
        200 | 204 => ProvisionOutcome::Deleted,
        404 => ProvisionOutcome::NotFound,
        _ => ProvisionOutcome::Unexpected { status, body },
    }
}

/// Classify the answer to an indexer run request. Only `202` means accepted.
pub fn classify_run(status: u16, body: String) -> RunOutcome {
    match status {
        202 => RunOutcome::Accepted,
        _ => RunOutcome::Unexpected { status, body },
    }
}

fn log_outcome(kind: ResourceKind, name: &str, outcome: &ProvisionOutcome) {
    match outcome {
        ProvisionOutcome::Created => info!(kind = %kind, name = %name, "Created resource"),
        ProvisionOutcome::AlreadyExists => {
            info!(kind = %kind, name = %name, "Resource already exists")
        }
        ProvisionOutcome::Deleted => info!(kind = %kind, name = %name, "Deleted resource"),
        ProvisionOutcome::NotFound => {
            info!(kind = %kind, name = %name, "Resource not found, nothing to delete")
        }
        ProvisionOutcome::Unexpected { status, body } => warn!(
            kind = %kind,
            name = %name,
            status = status,
            body = %body,
            "Unexpected response from search service"
        ),
    }
}

/// Per-document result in the body of a document batch response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    status_code: u16,
}

#[derive(Debug, Deserialize)]
struct IndexingResponse {
    value: Vec<IndexingResult>,
}

/// Azure Cognitive Search provider.
///
/// Every request carries `Content-Type: application/json` and the admin
/// `api-key` header.
///
/// # Example
///
/// ```ignore
/// use search_provisioner_repository::{AzureSearchProvider, ConnectionConfig};
///
/// let config = ConnectionConfig::new("https://acme.search.windows.net", api_key);
/// let provider = AzureSearchProvider::new(&config)?;
/// let count = provider.count_documents("covid-19-index").await?;
/// ```
pub struct AzureSearchProvider {
    client: Client,
    endpoints: Endpoints,
}

impl AzureSearchProvider {
    /// Create a new provider for the configured service.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, api key, api version and request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(AzureSearchProvider)` - A new provider instance
    /// * `Err(SearchServiceError)` - If the endpoint or key is invalid, or the
    ///   HTTP client cannot be built
    pub fn new(config: &ConnectionConfig) -> Result<Self, SearchServiceError> {
        let endpoints = Endpoints::new(&config.endpoint, &config.api_version)?;

        if config.api_key.trim().is_empty() {
            return Err(SearchServiceError::validation("api key cannot be empty"));
        }
        let mut api_key = HeaderValue::from_str(config.api_key.trim())
            .map_err(|e| SearchServiceError::validation(format!("Invalid api key: {}", e)))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchServiceError::connection(e.to_string()))?;

        info!(
            endpoint = %endpoints.base(),
            api_version = %endpoints.api_version(),
            "Created search service provider"
        );

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn create<T: Serialize + Sync>(
        &self,
        kind: ResourceKind,
        name: &str,
        descriptor: &T,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        let body = Self::request_body(descriptor)?;
        let response = self
            .client
            .post(self.endpoints.collection(kind))
            .json(&body)
            .send()
            .await?;

        let (status, body) = Self::status_and_body(response).await;
        let outcome = classify_create(status, body);
        log_outcome(kind, name, &outcome);
        Ok(outcome)
    }

    /// Serialize a request body, reporting failures as `SerializationError`.
    fn request_body<T: Serialize>(value: &T) -> Result<Value, SearchServiceError> {
        serde_json::to_value(value).map_err(|e| SearchServiceError::serialization(e.to_string()))
    }

    /// Status code and body text. A body that cannot be read is treated as empty.
    async fn status_and_body(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }

    /// Body of a successful read, or `UnexpectedStatus` for anything else.
    async fn success_body(response: Response) -> Result<String, SearchServiceError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, body = %body, "Search service request failed");
            return Err(SearchServiceError::unexpected_status(status.as_u16(), body));
        }
        Ok(body)
    }

    /// Attach the upload action to each document.
    fn upload_payload(documents: &[Value]) -> Result<Value, SearchServiceError> {
        let mut actions = Vec::with_capacity(documents.len());
        for (position, document) in documents.iter().enumerate() {
            let mut object = document
                .as_object()
                .cloned()
                .ok_or_else(|| {
                    SearchServiceError::validation(format!(
                        "Document at position {} is not a JSON object",
                        position
                    ))
                })?;
            object.insert("@search.action".to_string(), json!(UPLOAD_ACTION));
            actions.push(Value::Object(object));
        }
        Ok(json!({ "value": actions }))
    }
}

#[async_trait]
impl SearchServiceProvider for AzureSearchProvider {
    async fn create_data_source(
        &self,
        descriptor: &DataSourceDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        self.create(ResourceKind::DataSource, &descriptor.name, descriptor)
            .await
    }

    async fn create_index(
        &self,
        descriptor: &IndexDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        self.create(ResourceKind::Index, &descriptor.name, descriptor)
            .await
    }

    async fn create_indexer(
        &self,
        descriptor: &IndexerDescriptor,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        self.create(ResourceKind::Indexer, &descriptor.name, descriptor)
            .await
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<ProvisionOutcome, SearchServiceError> {
        let response = self
            .client
            .delete(self.endpoints.resource(kind, name))
            .send()
            .await?;

        let (status, body) = Self::status_and_body(response).await;
        let outcome = classify_delete(status, body);
        log_outcome(kind, name, &outcome);
        Ok(outcome)
    }

    async fn run_indexer(&self, name: &str) -> Result<RunOutcome, SearchServiceError> {
        let response = self
            .client
            .post(self.endpoints.indexer_run(name))
            .send()
            .await?;

        let (status, body) = Self::status_and_body(response).await;
        let outcome = classify_run(status, body);
        match &outcome {
            RunOutcome::Accepted => info!(indexer = %name, "Indexer run accepted"),
            RunOutcome::Unexpected { status, body } => warn!(
                indexer = %name,
                status = status,
                body = %body,
                "Indexer run was not accepted"
            ),
        }
        Ok(outcome)
    }

    async fn indexer_status(&self, name: &str) -> Result<IndexerStatusResponse, SearchServiceError> {
        let response = self
            .client
            .get(self.endpoints.indexer_status(name))
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        let status: IndexerStatusResponse = serde_json::from_str(&body)
            .map_err(|e| SearchServiceError::parse(format!("Invalid indexer status: {}", e)))?;

        debug!(indexer = %name, status = %status.job_status(), "Fetched indexer status");
        Ok(status)
    }

    async fn count_documents(&self, index: &str) -> Result<u64, SearchServiceError> {
        let response = self
            .client
            .get(self.endpoints.document_count(index))
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        utils::parse_document_count(&body)
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchServiceError> {
        let body = Self::request_body(request)?;
        let response = self
            .client
            .post(self.endpoints.search(index))
            .json(&body)
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        let results: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| SearchServiceError::parse(format!("Invalid search response: {}", e)))?;

        debug!(index = %index, hits = results.len(), total = results.total, "Search completed");
        Ok(results)
    }

    async fn upload_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BatchOperationSummary, SearchServiceError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }
        let payload = Self::upload_payload(documents)?;

        let response = self
            .client
            .post(self.endpoints.documents_index(index))
            .json(&payload)
            .send()
            .await?;

        // 207 means some documents failed; the per-document results say which.
        let status = response.status().as_u16();
        let body = response.text().await?;
        if status != 200 && status != 207 {
            warn!(index = %index, status = status, body = %body, "Document upload failed");
            return Err(SearchServiceError::unexpected_status(status, body));
        }

        let parsed: IndexingResponse = serde_json::from_str(&body)
            .map_err(|e| SearchServiceError::parse(format!("Invalid indexing response: {}", e)))?;

        let results = parsed
            .value
            .into_iter()
            .map(|r| {
                if r.status {
                    BatchOperationResult::success(r.key)
                } else {
                    let message = r
                        .error_message
                        .unwrap_or_else(|| format!("status code {}", r.status_code));
                    BatchOperationResult::failure(r.key, message)
                }
            })
            .collect();

        let summary = BatchOperationSummary::from_results(results);
        info!(
            index = %index,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Uploaded document batch"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_create() {
        assert_eq!(classify_create(201, String::new()), ProvisionOutcome::Created);
        assert_eq!(classify_create(200, String::new()), ProvisionOutcome::Created);
        assert_eq!(
            classify_create(409, "conflict".to_string()),
            ProvisionOutcome::AlreadyExists
        );
        assert_eq!(
            classify_create(
                400,
                r#"{"error":{"message":"Cannot create index 'idx1' because it already exists."}}"#
                    .to_string()
            ),
            ProvisionOutcome::AlreadyExists
        );
        assert_eq!(
            classify_create(400, "bad field".to_string()),
            ProvisionOutcome::Unexpected {
                status: 400,
                body: "bad field".to_string()
            }
        );
    }

    #[test]
    fn test_classify_delete() {
        assert_eq!(classify_delete(204, String::new()), ProvisionOutcome::Deleted);
        assert_eq!(classify_delete(404, String::new()), ProvisionOutcome::NotFound);
        assert!(classify_delete(403, "forbidden".to_string()).is_unexpected());
    }

    #[test]
    fn test_classify_run() {
        assert_eq!(classify_run(202, String::new()), RunOutcome::Accepted);
        assert!(!classify_run(409, "run in progress".to_string()).is_accepted());
    }

    #[test]
    fn test_upload_payload_adds_action() {
        let docs = vec![json!({"id": "1", "title": "a"}), json!({"id": "2"})];
        let payload = AzureSearchProvider::upload_payload(&docs).unwrap();

        let value = payload["value"].as_array().unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value[0]["@search.action"], "upload");
        assert_eq!(value[0]["title"], "a");
        assert_eq!(value[1]["id"], "2");
    }

    #[test]
    fn test_upload_payload_rejects_non_objects() {
        let docs = vec![json!({"id": "1"}), json!("not an object")];
        let result = AzureSearchProvider::upload_payload(&docs);
        assert!(matches!(
            result.unwrap_err(),
            SearchServiceError::ValidationError(_)
        ));
    }

    #[test]
    fn test_request_body_reports_serialization_errors() {
        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1u8, 2], 3u8);
        assert!(matches!(
            AzureSearchProvider::request_body(&bad).unwrap_err(),
            SearchServiceError::SerializationError(_)
        ));

        let body = AzureSearchProvider::request_body(&SearchRequest::new("vaccine")).unwrap();
        assert_eq!(body["search"], "vaccine");
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let config = ConnectionConfig::new("https://acme.search.windows.net", " ");
        assert!(AzureSearchProvider::new(&config).is_err());
    }

    #[test]
    fn test_new_builds_provider() {
        let config = ConnectionConfig::new("https://acme.search.windows.net/", "secret");
        let provider = AzureSearchProvider::new(&config).unwrap();
        assert_eq!(provider.endpoints().base(), "https://acme.search.windows.net");
    }
}
