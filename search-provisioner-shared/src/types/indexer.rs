//! Indexer descriptor.
//!
//! An indexer binds a data source to a target index with parsing rules.

use serde::{Deserialize, Serialize};

/// Parsing configuration applied to each source blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerConfiguration {
    /// How blobs are split into documents (e.g. `jsonLines`, `json`, `default`).
    pub parsing_mode: String,
    /// What to extract from each blob (e.g. `contentAndMetadata`).
    pub data_to_extract: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexerParameters {
    pub configuration: IndexerConfiguration,
}

/// Declarative description of a remote indexer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerDescriptor {
    pub name: String,
    pub data_source_name: String,
    pub target_index_name: String,
    pub parameters: IndexerParameters,
}

impl IndexerDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_source_name: impl Into<String>,
        target_index_name: impl Into<String>,
        configuration: IndexerConfiguration,
    ) -> Self {
        Self {
            name: name.into(),
            data_source_name: data_source_name.into(),
            target_index_name: target_index_name.into(),
            parameters: IndexerParameters { configuration },
        }
    }
}
