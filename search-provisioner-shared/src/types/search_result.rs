//! Search result types for the query API.
//!
//! Documents come back as dynamic JSON objects shaped by the index schema, so a
//! hit keeps its fields as a JSON map next to the relevance score.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single matching document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Relevance score assigned by the service. Higher is better.
    #[serde(rename = "@search.score", default)]
    pub score: f64,

    /// The selected document fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchHit {
    /// Returns a field rendered as text: strings as-is, other values as JSON.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Body of a search response: ordered hits and the total match count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Matches, ordered by relevance.
    #[serde(rename = "value", default)]
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents. May exceed `hits.len()` because of
    /// the result cap.
    #[serde(rename = "@odata.count", default)]
    pub total: u64,
}

impl SearchResponse {
    /// Create an empty search response.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
        }
    }

    pub fn new(hits: Vec<SearchHit>, total: u64) -> Self {
        Self { hits, total }
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of results in this response.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}
