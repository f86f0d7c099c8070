//! # Search Provisioner Shared
//!
//! This crate defines the data structures shared across the search provisioner:
//! the declarative descriptors for remote resources (data source, index, indexer),
//! the status of an indexer run, and the request/response types of the query API.

pub mod types;

pub use types::data_source::{DataSourceContainer, DataSourceCredentials, DataSourceDescriptor};
pub use types::index::{FieldDescriptor, FieldType, IndexDescriptor};
pub use types::indexer::{IndexerConfiguration, IndexerDescriptor, IndexerParameters};
pub use types::job_status::{IndexerExecution, IndexerStatusResponse, JobStatus};
pub use types::search_request::{SearchMode, SearchRequest};
pub use types::search_result::{SearchHit, SearchResponse};
