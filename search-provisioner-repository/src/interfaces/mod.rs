//! Interface definitions for the search service.
//!
//! This module defines the abstract `SearchServiceProvider` trait that allows
//! for dependency injection and mock implementations in tests.

mod search_service_provider;

pub use search_service_provider::SearchServiceProvider;
