//! Search service error types.
//!
//! This module defines the unified error type for all calls to the search
//! service. Expected remote conditions (a resource that already exists, a
//! resource missing on delete, an unexpected status on create/delete) are not
//! errors: they are reported as `ProvisionOutcome` values.

use thiserror::Error;

/// Errors from search service operations.
#[derive(Debug, Clone, Error)]
pub enum SearchServiceError {
    /// Validation error (e.g., empty resource name, index without a key field).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to build the HTTP client or reach the service.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or its body could not be read.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The service answered a read or query call with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse a response from the service.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchServiceError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create an unexpected status error.
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }
}

impl From<reqwest::Error> for SearchServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ConnectionError(err.to_string())
        } else {
            Self::RequestError(err.to_string())
        }
    }
}
