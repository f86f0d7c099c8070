//! Data source descriptor.
//!
//! A data source is a named reference to an external document container
//! (a blob storage container) that an indexer reads from.

use serde::{Deserialize, Serialize};

/// The only data source type the provisioner creates.
pub const AZURE_BLOB_TYPE: &str = "azureblob";

/// Connection credentials of a data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCredentials {
    pub connection_string: String,
}

/// Reference to the container holding the source documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSourceContainer {
    /// Container name in the storage account.
    pub name: String,
    /// Optional virtual folder inside the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Declarative description of a remote data source.
///
/// Immutable once created remotely; the `name` is its natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSourceDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub credentials: DataSourceCredentials,
    pub container: DataSourceContainer,
}

impl DataSourceDescriptor {
    /// Create a blob storage data source pointing at `container`.
    pub fn azure_blob(
        name: impl Into<String>,
        connection_string: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_type: AZURE_BLOB_TYPE.to_string(),
            credentials: DataSourceCredentials {
                connection_string: connection_string.into(),
            },
            container: DataSourceContainer {
                name: container.into(),
                query: None,
            },
        }
    }
}
