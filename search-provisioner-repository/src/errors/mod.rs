//! Error types for the search provisioner repository.

mod search_service_error;

pub use search_service_error::SearchServiceError;
