//! Resource descriptor builder.
//!
//! Pure functions from a corpus to the declarative descriptors sent to the
//! search service. Calling them twice with the same input yields identical
//! descriptors.

use search_provisioner_shared::{
    DataSourceContainer, DataSourceCredentials, DataSourceDescriptor, IndexDescriptor,
    IndexerConfiguration, IndexerDescriptor,
};
use search_provisioner_shared::types::data_source::AZURE_BLOB_TYPE;

use crate::config::CorpusConfig;

/// The three descriptors making up one provisioned corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptors {
    pub data_source: DataSourceDescriptor,
    pub index: IndexDescriptor,
    pub indexer: IndexerDescriptor,
}

/// Blob data source for the corpus container.
pub fn build_data_source(corpus: &CorpusConfig, connection_string: &str) -> DataSourceDescriptor {
    DataSourceDescriptor {
        name: corpus.data_source_name.clone(),
        source_type: AZURE_BLOB_TYPE.to_string(),
        credentials: DataSourceCredentials {
            connection_string: connection_string.to_string(),
        },
        container: DataSourceContainer {
            name: corpus.container_name.clone(),
            query: corpus.container_query.clone(),
        },
    }
}

/// Index with the corpus schema, fields in declaration order.
pub fn build_index(corpus: &CorpusConfig) -> IndexDescriptor {
    IndexDescriptor::new(corpus.index_name.clone(), corpus.fields.clone())
}

/// Indexer binding the corpus data source to its index.
pub fn build_indexer(corpus: &CorpusConfig) -> IndexerDescriptor {
    IndexerDescriptor::new(
        corpus.indexer_name.clone(),
        corpus.data_source_name.clone(),
        corpus.index_name.clone(),
        IndexerConfiguration {
            parsing_mode: corpus.parsing_mode.clone(),
            data_to_extract: corpus.data_to_extract.clone(),
        },
    )
}

pub fn build_all(corpus: &CorpusConfig, connection_string: &str) -> ResourceDescriptors {
    ResourceDescriptors {
        data_source: build_data_source(corpus, connection_string),
        index: build_index(corpus),
        indexer: build_indexer(corpus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_provisioner_repository::ProvisioningService;
    use serde_json::json;

    #[test]
    fn test_build_is_deterministic() {
        let corpus = CorpusConfig::covid_news();
        assert_eq!(build_all(&corpus, "conn"), build_all(&corpus, "conn"));
    }

    #[test]
    fn test_data_source_json() {
        let ds = build_data_source(&CorpusConfig::covid_news(), "conn-str");
        assert_eq!(
            serde_json::to_value(&ds).unwrap(),
            json!({
                "name": "covid-19-data-source",
                "type": "azureblob",
                "credentials": {"connectionString": "conn-str"},
                "container": {"name": "covid-news"}
            })
        );
    }

    #[test]
    fn test_index_has_exactly_one_key() {
        for corpus in [CorpusConfig::covid_news(), CorpusConfig::hotels()] {
            let index = build_index(&corpus);
            assert_eq!(index.key_fields().len(), 1);
            assert!(ProvisioningService::validate_index(&index).is_ok());
        }
    }

    #[test]
    fn test_covid_index_fields() {
        let index = build_index(&CorpusConfig::covid_news());
        assert_eq!(index.name, "covid-19-index");
        assert_eq!(index.key_fields()[0].name, "id");
        assert_eq!(index.searchable_field_names(), ["title", "body"]);
    }

    #[test]
    fn test_indexer_references_corpus() {
        let indexer = build_indexer(&CorpusConfig::covid_news());
        assert_eq!(
            serde_json::to_value(&indexer).unwrap(),
            json!({
                "name": "covid-19-indexer",
                "dataSourceName": "covid-19-data-source",
                "targetIndexName": "covid-19-index",
                "parameters": {
                    "configuration": {
                        "parsingMode": "jsonLines",
                        "dataToExtract": "contentAndMetadata"
                    }
                }
            })
        );
    }
}
