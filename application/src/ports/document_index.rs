//! Document index port
//!
//! A vector index holding chunked documents under one namespace.

use super::completion::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toolbridge_domain::DocumentChunk;

/// A document known to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub filename: String,
    pub text: String,
    #[serde(default)]
    pub score: f64,
}

#[async_trait]
pub trait DocumentIndexPort: Send + Sync {
    /// Store all chunks of one document, replacing any earlier version.
    async fn upload(&self, filename: &str, chunks: &[DocumentChunk]) -> Result<(), GatewayError>;

    async fn list(&self) -> Result<Vec<IndexedDocument>, GatewayError>;

    async fn delete(&self, filename: &str) -> Result<(), GatewayError>;

    /// Best matches first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentMatch>, GatewayError>;
}
