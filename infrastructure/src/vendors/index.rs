//! HTTP document index (chunk store with vector search).
//!
//! Every call is scoped to one namespace.

use super::{check_status, http_client, read_json, transport_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use toolbridge_application::{DocumentIndexPort, DocumentMatch, GatewayError, IndexedDocument};
use toolbridge_domain::DocumentChunk;
use tracing::debug;

pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<IndexedDocument>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<DocumentMatch>,
}

pub struct HttpDocumentIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    namespace: String,
}

impl HttpDocumentIndex {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl DocumentIndexPort for HttpDocumentIndex {
    async fn upload(&self, filename: &str, chunks: &[DocumentChunk]) -> Result<(), GatewayError> {
        debug!(filename, chunks = chunks.len(), namespace = %self.namespace, "Uploading document");
        let chunks: Vec<_> = chunks
            .iter()
            .map(|c| json!({ "index": c.index, "text": c.text }))
            .collect();

        let response = self
            .client
            .post(self.url("documents"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "namespace": self.namespace,
                "filename": filename,
                "chunks": chunks,
            }))
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;
        check_status("upload", response).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<IndexedDocument>, GatewayError> {
        let response = self
            .client
            .get(self.url("documents"))
            .query(&[("namespace", self.namespace.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("list", e))?;
        let response = check_status("list", response).await?;
        let body: ListResponse = read_json("list", response).await?;
        Ok(body.documents)
    }

    async fn delete(&self, filename: &str) -> Result<(), GatewayError> {
        let mut url = reqwest::Url::parse(&self.url("documents"))
            .map_err(|e| GatewayError::Other(format!("Invalid index URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Other("Index URL cannot have a path".to_string()))?
            .push(filename);

        let response = self
            .client
            .delete(url)
            .query(&[("namespace", self.namespace.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;
        check_status("delete", response).await?;
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentMatch>, GatewayError> {
        let response = self
            .client
            .post(self.url("query"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "namespace": self.namespace,
                "query": query,
                "topK": top_k,
            }))
            .send()
            .await
            .map_err(|e| transport_error("query", e))?;
        let response = check_status("query", response).await?;
        let body: QueryResponse = read_json("query", response).await?;
        Ok(body.matches)
    }
}
