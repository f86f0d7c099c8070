//! Configuration for the search service client and the provisioning service.

use std::time::Duration;

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "2020-06-30";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest document batch the service accepts in one indexing request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Connection settings for the REST provider.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Service endpoint, e.g. `https://my-service.search.windows.net`.
    pub endpoint: String,

    /// Admin API key, sent as the `api-key` header.
    pub api_key: String,

    /// Value of the `api-version` query parameter.
    pub api_version: String,

    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl ConnectionConfig {
    /// Create a connection config with the default api version and timeout.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for the provisioning service.
#[derive(Debug, Clone)]
pub struct ProvisioningServiceConfig {
    /// Maximum number of documents per upload call (None = unlimited).
    pub max_batch_size: Option<usize>,
}

impl Default for ProvisioningServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}

impl ProvisioningServiceConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a specific batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
