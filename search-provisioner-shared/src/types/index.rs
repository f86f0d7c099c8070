//! Index descriptor and field definitions.
//!
//! An index is a named, ordered schema of fields. Field capability flags are
//! always serialized explicitly: the remote service defaults omitted flags to
//! `true` for string fields.

use serde::{Deserialize, Serialize};

/// Primitive field types understood by the search service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Edm.Int32")]
    Int32,
    #[serde(rename = "Edm.Int64")]
    Int64,
    #[serde(rename = "Edm.Double")]
    Double,
    #[serde(rename = "Edm.Boolean")]
    Boolean,
    #[serde(rename = "Edm.DateTimeOffset")]
    DateTimeOffset,
}

/// A single field of an index schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub facetable: bool,
    /// Language analyzer for searchable fields (e.g. `en.lucene`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
}

impl FieldDescriptor {
    /// Create a field with every capability flag disabled.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            key: false,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
            analyzer: None,
        }
    }

    /// Create a string field marked as the document key.
    pub fn key_field(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String).key()
    }

    /// Create a full-text searchable string field.
    pub fn searchable_text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String).searchable()
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }

    /// Set the analyzer used for full-text search on this field.
    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }
}

/// Declarative description of a remote index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Returns every field marked as key. A valid index has exactly one.
    pub fn key_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.key).collect()
    }

    /// Names of the full-text searchable fields, in schema order.
    pub fn searchable_field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.searchable)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}
