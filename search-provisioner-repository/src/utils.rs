//! Utility functions for the search provisioner repository.

use crate::errors::SearchServiceError;

/// Maximum length of a resource name accepted by the service.
pub const MAX_RESOURCE_NAME_LEN: usize = 128;

/// Validate the name of a data source, index or indexer.
///
/// Names end up as REST path segments, so they must be non-empty and limited
/// to ASCII letters, digits, `-` and `_`.
///
/// # Arguments
///
/// * `kind` - Human readable resource kind, used in the error message
/// * `name` - The name to validate
///
/// # Returns
///
/// * `Ok(())` - If the name is usable
/// * `Err(SearchServiceError)` - If it is empty, too long or has other characters
///
/// # Example
///
/// ```
/// use search_provisioner_repository::validate_resource_name;
///
/// assert!(validate_resource_name("index", "covid-19-index").is_ok());
/// assert!(validate_resource_name("index", "").is_err());
/// ```
pub fn validate_resource_name(kind: &str, name: &str) -> Result<(), SearchServiceError> {
    if name.trim().is_empty() {
        return Err(SearchServiceError::validation(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(SearchServiceError::validation(format!(
            "{} name '{}' exceeds {} characters",
            kind, name, MAX_RESOURCE_NAME_LEN
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(SearchServiceError::validation(format!(
            "{} name '{}' contains invalid character '{}'",
            kind, name, c
        )));
    }
    Ok(())
}

/// Parse the plain-text body of `GET indexes/{name}/docs/$count`.
///
/// The service may prefix the integer with a UTF-8 byte order mark.
pub fn parse_document_count(body: &str) -> Result<u64, SearchServiceError> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    trimmed
        .parse::<u64>()
        .map_err(|e| SearchServiceError::parse(format!("Invalid document count '{}': {}", trimmed, e)))
}
