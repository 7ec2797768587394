//! Record store port
//!
//! Runs SOQL queries and describes objects against a Salesforce org.

use super::completion::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub total_size: u64,
    pub done: bool,
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Object metadata, trimmed to what clients need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldDescription>,
}

#[async_trait]
pub trait RecordStorePort: Send + Sync {
    async fn query(&self, soql: &str) -> Result<QueryResult, GatewayError>;

    async fn describe(&self, object: &str) -> Result<ObjectDescription, GatewayError>;
}
