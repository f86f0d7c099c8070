//! Static corpus presets.
//!
//! A corpus is the fixed configuration from which every resource descriptor is
//! built: resource names, the blob container, parsing rules, the index schema
//! and the default query shape.

use std::fmt;
use std::str::FromStr;

use search_provisioner_shared::{FieldDescriptor, FieldType, SearchMode, SearchRequest};

const LUCENE_EN: &str = "en.lucene";

/// Known corpus presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corpus {
    /// News articles stored as JSON lines in a blob container.
    #[default]
    CovidNews,
    /// The hotel sample index, loaded by document upload.
    Hotels,
}

impl Corpus {
    pub fn config(&self) -> CorpusConfig {
        match self {
            Corpus::CovidNews => CorpusConfig::covid_news(),
            Corpus::Hotels => CorpusConfig::hotels(),
        }
    }
}

impl FromStr for Corpus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "covid-news" | "covid_news" | "covid" => Ok(Corpus::CovidNews),
            "hotels" => Ok(Corpus::Hotels),
            other => Err(format!(
                "unknown corpus '{}', expected covid-news or hotels",
                other
            )),
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corpus::CovidNews => f.write_str("covid-news"),
            Corpus::Hotels => f.write_str("hotels"),
        }
    }
}

/// Everything needed to build descriptors and default queries for one corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    pub data_source_name: String,
    pub index_name: String,
    pub indexer_name: String,
    pub container_name: String,
    /// Optional virtual folder inside the container.
    pub container_query: Option<String>,
    pub parsing_mode: String,
    pub data_to_extract: String,
    /// Index schema, in order.
    pub fields: Vec<FieldDescriptor>,
    pub search_fields: Vec<String>,
    pub select_fields: Vec<String>,
    pub search_mode: SearchMode,
}

impl CorpusConfig {
    /// News article corpus: `id` key, `title` and `body` searchable.
    pub fn covid_news() -> Self {
        Self {
            data_source_name: "covid-19-data-source".to_string(),
            index_name: "covid-19-index".to_string(),
            indexer_name: "covid-19-indexer".to_string(),
            container_name: "covid-news".to_string(),
            container_query: None,
            parsing_mode: "jsonLines".to_string(),
            data_to_extract: "contentAndMetadata".to_string(),
            fields: vec![
                FieldDescriptor::key_field("id"),
                FieldDescriptor::new("timestamp", FieldType::String),
                FieldDescriptor::new("source", FieldType::String),
                FieldDescriptor::searchable_text("title"),
                FieldDescriptor::searchable_text("body"),
            ],
            search_fields: vec!["title".to_string()],
            select_fields: vec!["title".to_string(), "body".to_string()],
            search_mode: SearchMode::All,
        }
    }

    /// Hotel sample corpus with English analyzers on the text fields.
    ///
    /// Besides the index, this preset defines a blob data source over the
    /// `hotels` container (one JSON array per blob) and an indexer feeding the
    /// index from it, so `provision` and `run` work for hotels too and need
    /// `PLAYGROUND_CONN_STR`. Documents can also be pushed straight into the
    /// index with `upload`, which needs no connection string.
    pub fn hotels() -> Self {
        Self {
            data_source_name: "hotels-data-source".to_string(),
            index_name: "hotels".to_string(),
            indexer_name: "hotels-indexer".to_string(),
            container_name: "hotels".to_string(),
            container_query: None,
            parsing_mode: "jsonArray".to_string(),
            data_to_extract: "contentAndMetadata".to_string(),
            fields: vec![
                FieldDescriptor::key_field("HotelId"),
                FieldDescriptor::searchable_text("HotelName").with_analyzer(LUCENE_EN),
                FieldDescriptor::searchable_text("Description").with_analyzer(LUCENE_EN),
                FieldDescriptor::new("Rating", FieldType::Double),
                FieldDescriptor::new("Rooms", FieldType::Int32),
            ],
            search_fields: vec!["HotelName".to_string(), "Description".to_string()],
            select_fields: vec!["HotelName".to_string(), "Description".to_string()],
            search_mode: SearchMode::Any,
        }
    }

    /// Default search request for free text against this corpus.
    pub fn search_request(&self, text: &str) -> SearchRequest {
        SearchRequest::new(text)
            .with_search_fields(self.search_fields.iter().cloned())
            .with_select_fields(self.select_fields.iter().cloned())
            .with_mode(self.search_mode)
    }
}
