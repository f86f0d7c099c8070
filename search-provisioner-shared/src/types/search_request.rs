//! Search request types for the query API.
//!
//! `SearchRequest` serializes to the body of `POST indexes/{name}/docs/search`.

use serde::{Deserialize, Serialize, Serializer};

/// Default result cap, matching what the search UI requests.
pub const DEFAULT_TOP: usize = 100;

/// Maximum result cap accepted by the service for a single page.
pub const MAX_TOP: usize = 1000;

/// Whether any or all search terms must match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Any,
    All,
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(SearchMode::Any),
            "all" => Ok(SearchMode::All),
            other => Err(format!("unknown search mode '{}', expected any or all", other)),
        }
    }
}

/// Serialize a field list as the comma separated string the service expects.
fn join_fields<S>(fields: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&fields.join(", "))
}

/// Search query parameters.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Always request the total match count.
    pub count: bool,

    /// Free-text query.
    pub search: String,

    /// Fields the text is matched against. Empty means all searchable fields.
    #[serde(
        serialize_with = "join_fields",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub search_fields: Vec<String>,

    pub search_mode: SearchMode,

    /// Fields returned for each hit. Empty means all retrievable fields.
    #[serde(
        rename = "select",
        serialize_with = "join_fields",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub select_fields: Vec<String>,

    /// Result cap.
    pub top: usize,
}

impl SearchRequest {
    /// Create a request matching `search` against all searchable fields.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            count: true,
            search: search.into(),
            search_fields: Vec::new(),
            search_mode: SearchMode::default(),
            select_fields: Vec::new(),
            top: DEFAULT_TOP,
        }
    }

    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_select_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Set the result cap, clamped to `1..=MAX_TOP`.
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top.clamp(1, MAX_TOP);
        self
    }

    /// Returns true if the query text is blank.
    pub fn is_blank(&self) -> bool {
        self.search.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_rest_body() {
        let request = SearchRequest::new("vaccine trial")
            .with_search_fields(["title"])
            .with_select_fields(["title", "body"])
            .with_mode(SearchMode::All);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["count"], true);
        assert_eq!(json["search"], "vaccine trial");
        assert_eq!(json["searchFields"], "title");
        assert_eq!(json["searchMode"], "all");
        assert_eq!(json["select"], "title, body");
        assert_eq!(json["top"], 100);
    }

    #[test]
    fn test_empty_field_lists_are_omitted() {
        let json = serde_json::to_value(SearchRequest::new("x")).unwrap();
        assert!(json.get("searchFields").is_none());
        assert!(json.get("select").is_none());
        assert_eq!(json["searchMode"], "any");
    }

    #[test]
    fn test_top_is_clamped() {
        assert_eq!(SearchRequest::new("x").with_top(0).top, 1);
        assert_eq!(SearchRequest::new("x").with_top(5000).top, MAX_TOP);
        assert_eq!(SearchRequest::new("x").with_top(10).top, 10);
    }

    #[test]
    fn test_blank_query() {
        assert!(SearchRequest::new("   ").is_blank());
        assert!(!SearchRequest::new("mask").is_blank());
    }

    #[test]
    fn test_parse_search_mode() {
        assert_eq!("ALL".parse::<SearchMode>().unwrap(), SearchMode::All);
        assert_eq!("any".parse::<SearchMode>().unwrap(), SearchMode::Any);
        assert!("some".parse::<SearchMode>().is_err());
    }
}
