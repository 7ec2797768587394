//! In-memory ports and request helpers for router tests

use super::state::AppState;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use toolbridge_application::{
    CapabilityRegistryPort, CompletionGateway, CompletionRequest, ConfigError, DocumentIndexPort,
    DocumentMatch, FieldDescription, GatewayError, IndexedDocument, ObjectDescription,
    QueryResult, RecordStorePort, RegistryError, SearchHit, VendorFactory, WebSearchPort,
};
use toolbridge_domain::{
    Capability, CapabilityOutput, DocumentChunk, LlmResponse, ProviderSpec, ProviderStatus,
    QueryTranslator,
};
use tower::ServiceExt;

// ==================== Vendors ====================

pub(crate) struct MockCompletion {
    responses: Mutex<VecDeque<LlmResponse>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn new(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(texts.iter().map(|t| LlmResponse::from_text(*t)).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionGateway for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::Other("No more responses".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct MockRecordStore {
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl RecordStorePort for MockRecordStore {
    async fn query(&self, soql: &str) -> Result<QueryResult, GatewayError> {
        self.queries.lock().unwrap().push(soql.to_string());
        Ok(QueryResult {
            total_size: 1,
            done: true,
            records: vec![serde_json::json!({ "Id": "001A", "Name": "Acme" })],
        })
    }

    async fn describe(&self, object: &str) -> Result<ObjectDescription, GatewayError> {
        Ok(ObjectDescription {
            name: object.to_string(),
            label: object.to_string(),
            fields: vec![FieldDescription {
                name: "Id".to_string(),
                label: "Record ID".to_string(),
                field_type: "id".to_string(),
            }],
        })
    }
}

pub(crate) enum MockSearch {
    Hits(Vec<SearchHit>),
    Fails { status: u16, message: String },
}

#[async_trait]
impl WebSearchPort for MockSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>, GatewayError> {
        match self {
            MockSearch::Hits(hits) => Ok(hits.iter().take(max_results).cloned().collect()),
            MockSearch::Fails { status, message } => Err(GatewayError::upstream(
                "search",
                *status,
                Some(message.clone()),
            )),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockIndex {
    pub uploads: Mutex<Vec<(String, usize)>>,
    pub deleted: Mutex<Vec<String>>,
    pub matches: Vec<DocumentMatch>,
}

#[async_trait]
impl DocumentIndexPort for MockIndex {
    async fn upload(&self, filename: &str, chunks: &[DocumentChunk]) -> Result<(), GatewayError> {
        self.uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), chunks.len()));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<IndexedDocument>, GatewayError> {
        Ok(self
            .uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(filename, chunks)| IndexedDocument {
                filename: filename.clone(),
                chunk_count: Some(*chunks),
            })
            .collect())
    }

    async fn delete(&self, filename: &str) -> Result<(), GatewayError> {
        self.deleted.lock().unwrap().push(filename.to_string());
        Ok(())
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<DocumentMatch>, GatewayError> {
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

/// Hands out whichever mocks are set; unset ones behave like missing credentials.
#[derive(Default)]
pub(crate) struct MockVendors {
    pub completion: Option<Arc<MockCompletion>>,
    pub store: Option<Arc<MockRecordStore>>,
    pub search: Option<Arc<MockSearch>>,
    pub index: Option<Arc<MockIndex>>,
    pub tokens: Mutex<Vec<Option<String>>>,
}

impl VendorFactory for MockVendors {
    fn completion(&self) -> Result<Arc<dyn CompletionGateway>, ConfigError> {
        match &self.completion {
            Some(c) => Ok(c.clone()),
            None => Err(ConfigError::MissingVariable {
                name: "COMPLETION_API_KEY",
            }),
        }
    }

    fn record_store(
        &self,
        access_token: Option<&str>,
    ) -> Result<Arc<dyn RecordStorePort>, ConfigError> {
        self.tokens
            .lock()
            .unwrap()
            .push(access_token.map(str::to_string));
        match &self.store {
            Some(s) => Ok(s.clone()),
            None => Err(ConfigError::MissingVariable {
                name: "SALESFORCE_INSTANCE_URL",
            }),
        }
    }

    fn web_search(&self) -> Result<Arc<dyn WebSearchPort>, ConfigError> {
        match &self.search {
            Some(s) => Ok(s.clone()),
            None => Err(ConfigError::MissingVariable {
                name: "SEARCH_API_KEY",
            }),
        }
    }

    fn document_index(&self) -> Result<Arc<dyn DocumentIndexPort>, ConfigError> {
        match &self.index {
            Some(i) => Ok(i.clone()),
            None => Err(ConfigError::MissingVariable {
                name: "INDEX_API_URL",
            }),
        }
    }
}

// ==================== Registry ====================

/// Registry with one `weather` provider; `weather__slow` always times out.
pub(crate) struct MockRegistry {
    capabilities: Vec<Capability>,
    pub registered: Mutex<Vec<String>>,
    pub torn_down: Mutex<bool>,
}

impl MockRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            capabilities: vec![
                Capability::new("weather", "forecast", Some("Forecast".to_string()), None),
                Capability::new("weather", "slow", None, None),
            ],
            registered: Mutex::new(Vec::new()),
            torn_down: Mutex::new(false),
        })
    }
}

#[async_trait]
impl CapabilityRegistryPort for MockRegistry {
    async fn register_provider(&self, spec: ProviderSpec) -> Result<Vec<Capability>, RegistryError> {
        spec.validate()
            .map_err(|e| RegistryError::InvalidProvider(e.to_string()))?;
        self.registered.lock().unwrap().push(spec.name.clone());
        Ok(vec![Capability::new(spec.name, "echo", None, None)])
    }

    async fn list_capabilities(&self) -> Vec<Capability> {
        self.capabilities.clone()
    }

    async fn invoke(
        &self,
        qualified_name: &str,
        arguments: Value,
    ) -> Result<CapabilityOutput, RegistryError> {
        match qualified_name {
            "weather__forecast" => Ok(CapabilityOutput {
                text: format!("sunny in {}", arguments["city"].as_str().unwrap_or("?")),
                is_error: false,
                raw: serde_json::json!({}),
            }),
            "weather__slow" => Err(RegistryError::Timeout {
                provider: "weather".to_string(),
                method: "tools/call".to_string(),
            }),
            other => Err(RegistryError::UnknownCapability(other.to_string())),
        }
    }

    async fn status(&self) -> BTreeMap<String, ProviderStatus> {
        BTreeMap::from([(
            "weather".to_string(),
            ProviderStatus {
                connected: true,
                capability_count: self.capabilities.len(),
            },
        )])
    }

    async fn teardown_all(&self) {
        *self.torn_down.lock().unwrap() = true;
    }
}

// ==================== Requests ====================

pub(crate) fn state(vendors: Arc<MockVendors>, registry: Arc<MockRegistry>) -> AppState {
    AppState::new(
        registry,
        vendors,
        Arc::new(QueryTranslator::new().unwrap()),
    )
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub(crate) fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Run one request through the router; an empty body reads as `null`.
pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
