//! Tavily-style web search.

use super::{check_status, http_client, read_json, transport_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use toolbridge_application::{GatewayError, SearchHit, WebSearchPort};
use tracing::debug;

pub const DEFAULT_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawHit>,
}

/// Vendor hits may omit any field.
#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
}

impl From<RawHit> for SearchHit {
    fn from(hit: RawHit) -> Self {
        SearchHit {
            title: hit.title,
            url: hit.url,
            content: hit.content,
            score: hit.score,
        }
    }
}

pub struct TavilySearch {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            url: DEFAULT_SEARCH_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl WebSearchPort for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, GatewayError> {
        debug!(query, max_results, "Web search");
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await
            .map_err(|e| transport_error("search", e))?;
        let response = check_status("search", response).await?;
        let body: SearchResponse = read_json("search", response).await?;

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(SearchHit::from)
            .collect())
    }
}
