//! Web search port

use super::completion::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single search hit, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[async_trait]
pub trait WebSearchPort: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, GatewayError>;
}
