//! Environment configuration and dependency wiring for the provisioner.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::builder::build_all;
use crate::config::{Corpus, CorpusConfig};
use crate::orchestrator::{FailurePolicy, Orchestrator, OrchestratorConfig};
use crate::poller::PollConfig;
use crate::ProvisionerError;
use search_provisioner_repository::config::{DEFAULT_API_VERSION, DEFAULT_REQUEST_TIMEOUT};
use search_provisioner_repository::{AzureSearchProvider, ConnectionConfig, ProvisioningService};

/// Default interval between indexer status polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Blob storage connection string. Only needed to create the data source.
    pub connection_string: Option<String>,
    pub api_version: String,
    pub corpus: Corpus,
    pub poll_interval: Duration,
    pub poll_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub request_timeout: Duration,
}

impl ProvisionerConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_ENDPOINT`: Search service URL (required)
    /// - `ACS_API_KEY`: Admin API key (required)
    /// - `PLAYGROUND_CONN_STR`: Blob storage connection string (needed for the data source)
    /// - `SEARCH_API_VERSION`: REST api version (default: 2020-06-30)
    /// - `SEARCH_CORPUS`: Corpus preset, "covid-news" or "hotels" (default: covid-news)
    /// - `INDEXER_POLL_INTERVAL_SECS`: Seconds between status polls (default: 5)
    /// - `INDEXER_POLL_TIMEOUT_SECS`: Give up polling after this many seconds (default: none)
    /// - `PROVISION_FAILURE_POLICY`: "continue" or "abort" (default: continue)
    /// - `SEARCH_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    pub fn from_env() -> Result<Self, ProvisionerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProvisionerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ProvisionerError::config(format!("{} is not set", key)))
        };

        let endpoint = required("SEARCH_ENDPOINT")?;
        let api_key = required("ACS_API_KEY")?;
        let connection_string = lookup("PLAYGROUND_CONN_STR").filter(|v| !v.trim().is_empty());
        let api_version =
            lookup("SEARCH_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let corpus = match lookup("SEARCH_CORPUS") {
            Some(value) => value.parse::<Corpus>().map_err(ProvisionerError::config)?,
            None => Corpus::default(),
        };

        let poll_interval = Duration::from_secs(
            parse_secs(&lookup, "INDEXER_POLL_INTERVAL_SECS")?
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        );
        if poll_interval.is_zero() {
            return Err(ProvisionerError::config(
                "INDEXER_POLL_INTERVAL_SECS must be greater than zero",
            ));
        }
        let poll_timeout = parse_secs(&lookup, "INDEXER_POLL_TIMEOUT_SECS")?.map(Duration::from_secs);
        let request_timeout = parse_secs(&lookup, "SEARCH_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let failure_policy = match lookup("PROVISION_FAILURE_POLICY") {
            Some(value) => value
                .parse::<FailurePolicy>()
                .map_err(ProvisionerError::config)?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            endpoint,
            api_key,
            connection_string,
            api_version,
            corpus,
            poll_interval,
            poll_timeout,
            failure_policy,
            request_timeout,
        })
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.endpoint, &self.api_key)
            .with_api_version(&self.api_version)
            .with_request_timeout(self.request_timeout)
    }

    pub fn poll(&self) -> PollConfig {
        PollConfig::new(self.poll_interval).with_timeout(self.poll_timeout)
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>, ProvisionerError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ProvisionerError::config(format!("{} is not a number: {}", key, e))),
        None => Ok(None),
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: ProvisionerConfig,
    pub corpus: CorpusConfig,
    pub service: ProvisioningService,
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Build the provider, service and orchestrator from a configuration.
    ///
    /// No request is sent here; the endpoint and key are only validated.
    pub fn new(config: ProvisionerConfig) -> Result<Self, ProvisionerError> {
        info!(
            endpoint = %config.endpoint,
            api_version = %config.api_version,
            corpus = %config.corpus,
            poll_interval_secs = config.poll_interval.as_secs(),
            poll_timeout_secs = ?config.poll_timeout.map(|t| t.as_secs()),
            failure_policy = ?config.failure_policy,
            "Initializing dependencies"
        );

        let provider = AzureSearchProvider::new(&config.connection()).map_err(|e| {
            ProvisionerError::config(format!("Failed to create search provider: {}", e))
        })?;
        let service = ProvisioningService::new(Arc::new(provider));
        let corpus = config.corpus.config();

        let descriptors = build_all(
            &corpus,
            config.connection_string.as_deref().unwrap_or_default(),
        );
        let orchestrator = Orchestrator::with_config(
            service.clone(),
            descriptors,
            OrchestratorConfig {
                failure_policy: config.failure_policy,
                poll: config.poll(),
            },
        );

        Ok(Self {
            config,
            corpus,
            service,
            orchestrator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net/"),
            ("ACS_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.api_version, "2020-06-30");
        assert_eq!(config.corpus, Corpus::CovidNews);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.poll_timeout, None);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.connection_string.is_none());
    }

    #[test]
    fn test_missing_required() {
        let result = ProvisionerConfig::from_lookup(lookup(&[("ACS_API_KEY", "secret")]));
        assert!(matches!(result, Err(ProvisionerError::ConfigError(_))));

        let result = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "  "),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "secret"),
            ("PLAYGROUND_CONN_STR", "DefaultEndpointsProtocol=https;AccountName=x"),
            ("SEARCH_CORPUS", "hotels"),
            ("INDEXER_POLL_INTERVAL_SECS", "2"),
            ("INDEXER_POLL_TIMEOUT_SECS", "60"),
            ("PROVISION_FAILURE_POLICY", "abort"),
        ]))
        .unwrap();

        assert_eq!(config.corpus, Corpus::Hotels);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.connection_string.is_some());
    }

    #[test]
    fn test_invalid_numbers() {
        let result = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "secret"),
            ("INDEXER_POLL_INTERVAL_SECS", "soon"),
        ]));
        assert!(result.is_err());

        let result = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "secret"),
            ("INDEXER_POLL_INTERVAL_SECS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_failure_policy() {
        let result = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "secret"),
            ("PROVISION_FAILURE_POLICY", "abrot"),
        ]));
        match result {
            Err(ProvisionerError::ConfigError(msg)) => assert!(msg.contains("abrot")),
            other => panic!("expected config error, got {:?}", other.map(|c| c.failure_policy)),
        }
    }

    #[test]
    fn test_dependencies_rejects_bad_endpoint() {
        let mut config = ProvisionerConfig::from_lookup(lookup(&[
            ("SEARCH_ENDPOINT", "https://acme.search.windows.net"),
            ("ACS_API_KEY", "secret"),
        ]))
        .unwrap();
        config.endpoint = "not a url".to_string();

        assert!(matches!(
            Dependencies::new(config),
            Err(ProvisionerError::ConfigError(_))
        ));
    }
}
