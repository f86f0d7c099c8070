//! URL construction for the REST API.

use url::Url;

use crate::errors::SearchServiceError;
use crate::types::ResourceKind;

/// Builds request URLs for one service endpoint and api version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    api_version: String,
}

impl Endpoints {
    /// Create endpoints for a service.
    ///
    /// Any trailing `/` on the endpoint is trimmed. The endpoint must be an
    /// absolute http(s) URL.
    pub fn new(endpoint: &str, api_version: &str) -> Result<Self, SearchServiceError> {
        let parsed = Url::parse(endpoint.trim())
            .map_err(|e| SearchServiceError::validation(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(SearchServiceError::validation(format!(
                "Endpoint '{}' must use http or https",
                endpoint
            )));
        }
        if api_version.trim().is_empty() {
            return Err(SearchServiceError::validation("api version cannot be empty"));
        }

        Ok(Self {
            base: endpoint.trim().trim_end_matches('/').to_string(),
            api_version: api_version.trim().to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.base, path, self.api_version)
    }

    /// `POST` target for creating a resource of `kind`.
    pub fn collection(&self, kind: ResourceKind) -> String {
        self.url(kind.collection())
    }

    /// A single named resource, used for `DELETE`.
    pub fn resource(&self, kind: ResourceKind, name: &str) -> String {
        self.url(&format!("{}/{}", kind.collection(), name))
    }

    pub fn indexer_run(&self, name: &str) -> String {
        self.url(&format!("indexers/{}/run", name))
    }

    pub fn indexer_status(&self, name: &str) -> String {
        self.url(&format!("indexers/{}/status", name))
    }

    pub fn document_count(&self, index: &str) -> String {
        self.url(&format!("indexes/{}/docs/$count", index))
    }

    pub fn search(&self, index: &str) -> String {
        self.url(&format!("indexes/{}/docs/search", index))
    }

    /// Document batch endpoint (upload, merge, delete actions).
    pub fn documents_index(&self, index: &str) -> String {
        self.url(&format!("indexes/{}/docs/index", index))
    }
}
