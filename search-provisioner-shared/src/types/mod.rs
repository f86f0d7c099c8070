//! Core data structures used across the search provisioner.
//!
//! Descriptors serialize directly to the JSON bodies expected by the search
//! service REST API.

pub mod data_source;
pub mod index;
pub mod indexer;
pub mod job_status;
pub mod search_request;
pub mod search_result;
