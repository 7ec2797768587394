//! Salesforce REST record store.

use super::{check_status, http_client, read_json, transport_error};
use async_trait::async_trait;
use toolbridge_application::{GatewayError, ObjectDescription, QueryResult, RecordStorePort};
use tracing::debug;

pub const DEFAULT_API_VERSION: &str = "v59.0";

pub struct SalesforceRecordStore {
    client: reqwest::Client,
    instance_url: String,
    api_version: String,
    access_token: String,
}

impl SalesforceRecordStore {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/{}/{}",
            self.instance_url, self.api_version, path
        )
    }
}

fn is_object_name(object: &str) -> bool {
    !object.is_empty() && object.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl RecordStorePort for SalesforceRecordStore {
    async fn query(&self, soql: &str) -> Result<QueryResult, GatewayError> {
        debug!(soql, "Running SOQL query");
        let response = self
            .client
            .get(self.data_url("query"))
            .query(&[("q", soql)])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| transport_error("query", e))?;
        let response = check_status("query", response).await?;
        read_json("query", response).await
    }

    async fn describe(&self, object: &str) -> Result<ObjectDescription, GatewayError> {
        if !is_object_name(object) {
            return Err(GatewayError::Other(format!("Invalid object name: {}", object)));
        }
        let response = self
            .client
            .get(self.data_url(&format!("sobjects/{}/describe", object)))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| transport_error("describe", e))?;
        let response = check_status("describe", response).await?;
        read_json("describe", response).await
    }
}
