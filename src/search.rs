//! Search API client.
//!
//! Queries are sent as a keyword disjunction (`a OR b OR c`) and the hits'
//! vendor scores are collected as-is: no local re-ranking or truncation.

use crate::config::CoveoConfig;
use crate::error::{CoveoError, Result};
use crate::http::check;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character some datasets use in place of a space inside queries.
pub const QUERY_PLACEHOLDER: char = '$';

/// Turn query text into a keyword disjunction.
///
/// `$` counts as a space. Every single space separates terms, so a run of
/// spaces yields empty terms (`"a  b"` becomes `"a OR  OR b"`).
pub fn disjunction(query: &str) -> String {
    query
        .replace(QUERY_PLACEHOLDER, " ")
        .split(' ')
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Corpus id of a hit: the last `/`-separated segment of its `uniqueId`.
pub fn corpus_id(unique_id: &str) -> &str {
    unique_id.rsplit('/').next().unwrap_or(unique_id)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    q: String,
    number_of_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

/// One entry of the `results` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub unique_id: String,
    pub score: f64,
    #[serde(default)]
    pub title: Option<String>,
}

impl SearchHit {
    pub fn corpus_id(&self) -> &str {
        corpus_id(&self.unique_id)
    }
}

/// Project hits onto corpus id to score. A repeated id keeps its last score.
pub fn score_map(hits: &[SearchHit]) -> BTreeMap<String, f64> {
    hits.iter()
        .map(|hit| (hit.corpus_id().to_string(), hit.score))
        .collect()
}

/// What the search endpoint said about one query.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// Success, hits in vendor rank order.
    Hits(Vec<SearchHit>),
    /// Non-success status; the query yields nothing.
    Rejected { status: u16, body: String },
}

/// Client for the organization's search endpoint.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base: String,
    search_api_key: String,
    results_per_query: u32,
}

impl SearchClient {
    pub fn new(config: &CoveoConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base: config.search_api_base(),
            search_api_key: config.search_api_key.clone(),
            results_per_query: config.results_per_query,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/search/v3", self.base)
    }

    /// Run one query. Transport failures and unreadable success bodies are
    /// errors; a non-success status is a [`QueryOutcome::Rejected`].
    pub async fn query(&self, text: &str) -> Result<QueryOutcome> {
        let request = SearchRequest {
            q: disjunction(text),
            number_of_results: self.results_per_query,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.search_api_key))
            .json(&request)
            .send()
            .await?;

        match check(response).await? {
            Ok(response) => {
                let body = response.text().await?;
                let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
                    CoveoError::Serialization(format!(
                        "Failed to parse search response: {}. Response: {}",
                        e,
                        body.chars().take(200).collect::<String>()
                    ))
                })?;
                Ok(QueryOutcome::Hits(parsed.results))
            }
            Err((status, body)) => Ok(QueryOutcome::Rejected { status, body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjunction() {
        assert_eq!(disjunction("a$b c"), "a OR b OR c");
        assert_eq!(disjunction("hello world"), "hello OR world");
        assert_eq!(disjunction("single"), "single");
        assert_eq!(disjunction(""), "");
    }

    #[test]
    fn test_disjunction_keeps_empty_terms() {
        assert_eq!(disjunction("a  b"), "a OR  OR b");
        assert_eq!(disjunction("a$"), "a OR ");
        assert_eq!(disjunction(" x"), " OR x");
    }

    #[test]
    fn test_corpus_id() {
        assert_eq!(corpus_id("x/y/doc1"), "doc1");
        assert_eq!(corpus_id("corpus://d42"), "d42");
        assert_eq!(corpus_id("plain"), "plain");
        assert_eq!(corpus_id("trailing/"), "");
    }

    #[test]
    fn test_score_map() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"results": [
                {"uniqueId": "42.1234$corpus://a", "score": 10},
                {"uniqueId": "42.1234$corpus://b", "score": 3.5, "title": "B"}
            ], "totalCount": 2}"#,
        )
        .unwrap();

        let scores = score_map(&response.results);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["a"], 10.0);
        assert_eq!(scores["b"], 3.5);
        assert_eq!(response.results[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn test_request_shape() {
        let request = SearchRequest {
            q: disjunction("a b"),
            number_of_results: 1000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"q": "a OR b", "numberOfResults": 1000}));
    }

    #[test]
    fn test_endpoint_construction() {
        let config = CoveoConfig {
            search_api_base: Some("https://platform.example.com/".to_string()),
            ..Default::default()
        };
        let client = SearchClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://platform.example.com/rest/search/v3");
    }
}
