//! Query façade.
//!
//! Runs a free-text search against the corpus index and renders the hits as
//! a plain numbered listing.

use std::fmt::Write;

use tracing::info;

use crate::config::CorpusConfig;
use crate::errors::OrchestratorError;
use search_provisioner_repository::ProvisioningService;
use search_provisioner_shared::{SearchRequest, SearchResponse};

/// Longest field value shown in a listing before it is cut.
const MAX_FIELD_CHARS: usize = 240;

/// Run a query against the corpus index.
///
/// Blank text is rejected before any request is sent. A query with no
/// matches returns an empty response with a total of 0.
pub async fn run_query(
    service: &ProvisioningService,
    corpus: &CorpusConfig,
    request: &SearchRequest,
) -> Result<SearchResponse, OrchestratorError> {
    let response = service.search(&corpus.index_name, request).await?;
    info!(
        index = %corpus.index_name,
        query = %request.search,
        hits = response.len(),
        total = response.total,
        "Query completed"
    );
    Ok(response)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_FIELD_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_FIELD_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Render the hits of a query as text.
///
/// The first display field is the heading of each hit; the others are
/// indented below it. An empty response renders as
/// `No results found for "<query>".`
pub fn render_results(query: &str, response: &SearchResponse, display_fields: &[String]) -> String {
    if response.is_empty() {
        return format!("No results found for \"{}\".", query);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} results for \"{}\":",
        response.len(),
        response.total,
        query
    );

    for (position, hit) in response.hits.iter().enumerate() {
        let mut fields = display_fields
            .iter()
            .filter_map(|name| hit.field_text(name).map(|text| truncate(&text)));

        let heading = fields.next().unwrap_or_else(|| "(untitled)".to_string());
        let _ = writeln!(out, "{}. {} [{:.2}]", position + 1, heading, hit.score);
        for text in fields {
            let _ = writeln!(out, "   {}", text);
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_provisioner_shared::SearchHit;
    use serde_json::json;

    fn hit(score: f64, title: &str, body: &str) -> SearchHit {
        let fields = json!({"title": title, "body": body});
        SearchHit {
            score,
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    fn display() -> Vec<String> {
        vec!["title".to_string(), "body".to_string()]
    }

    #[test]
    fn test_render_no_results() {
        let text = render_results("zzqxnonexistent", &SearchResponse::empty(), &display());
        assert_eq!(text, "No results found for \"zzqxnonexistent\".");
    }

    #[test]
    fn test_render_numbered_listing() {
        let response = SearchResponse::new(
            vec![
                hit(3.5, "Vaccine trial begins", "Phase three starts today."),
                hit(1.25, "Trial results", "Early data is promising."),
            ],
            7,
        );

        let text = render_results("trial", &response, &display());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2 of 7 results for \"trial\":");
        assert_eq!(lines[1], "1. Vaccine trial begins [3.50]");
        assert_eq!(lines[2], "   Phase three starts today.");
        assert_eq!(lines[3], "2. Trial results [1.25]");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_long_fields_are_truncated() {
        let body = "word ".repeat(100);
        let response = SearchResponse::new(vec![hit(1.0, "t", &body)], 1);
        let text = render_results("word", &response, &display());
        let body_line = text.lines().nth(2).unwrap_or_default();
        assert!(body_line.ends_with("..."));
        assert!(body_line.len() < body.len());
    }
}
