//! Vendor adapters built from environment variables.
//!
//! Variables are read on every call so a changed key takes effect on the
//! next request. Secrets never come from the config file.

use crate::vendors::completion::{DEFAULT_COMPLETION_MODEL, DEFAULT_COMPLETION_URL};
use crate::vendors::index::DEFAULT_NAMESPACE;
use crate::vendors::salesforce::DEFAULT_API_VERSION;
use crate::vendors::search::DEFAULT_SEARCH_URL;
use crate::vendors::{HttpDocumentIndex, OpenAiCompletionGateway, SalesforceRecordStore, TavilySearch};
use std::sync::Arc;
use toolbridge_application::{
    CompletionGateway, ConfigError, DocumentIndexPort, RecordStorePort, VendorFactory,
    WebSearchPort,
};

pub const COMPLETION_API_KEY: &str = "COMPLETION_API_KEY";
pub const COMPLETION_API_URL: &str = "COMPLETION_API_URL";
pub const COMPLETION_MODEL: &str = "COMPLETION_MODEL";
pub const SEARCH_API_KEY: &str = "SEARCH_API_KEY";
pub const SEARCH_API_URL: &str = "SEARCH_API_URL";
pub const SALESFORCE_INSTANCE_URL: &str = "SALESFORCE_INSTANCE_URL";
pub const SALESFORCE_ACCESS_TOKEN: &str = "SALESFORCE_ACCESS_TOKEN";
pub const SALESFORCE_API_VERSION: &str = "SALESFORCE_API_VERSION";
pub const INDEX_API_URL: &str = "INDEX_API_URL";
pub const INDEX_API_KEY: &str = "INDEX_API_KEY";
pub const INDEX_NAMESPACE: &str = "INDEX_NAMESPACE";

/// Non-empty value of `name`, trimmed.
fn optional(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVariable { name })
}

fn url(name: &'static str, value: String) -> Result<String, ConfigError> {
    reqwest::Url::parse(&value).map_err(|e| ConfigError::InvalidVariable {
        name,
        reason: e.to_string(),
    })?;
    Ok(value)
}

/// [`VendorFactory`] backed by the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvVendorFactory;

impl EnvVendorFactory {
    pub fn new() -> Self {
        Self
    }
}

impl VendorFactory for EnvVendorFactory {
    fn completion(&self) -> Result<Arc<dyn CompletionGateway>, ConfigError> {
        let api_key = required(COMPLETION_API_KEY)?;
        let base_url = url(
            COMPLETION_API_URL,
            optional(COMPLETION_API_URL).unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
        )?;
        let model =
            optional(COMPLETION_MODEL).unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string());

        Ok(Arc::new(
            OpenAiCompletionGateway::new(api_key, model).with_base_url(base_url),
        ))
    }

    fn record_store(
        &self,
        access_token: Option<&str>,
    ) -> Result<Arc<dyn RecordStorePort>, ConfigError> {
        let instance_url = url(SALESFORCE_INSTANCE_URL, required(SALESFORCE_INSTANCE_URL)?)?;
        let access_token = match access_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token.to_string(),
            None => required(SALESFORCE_ACCESS_TOKEN)?,
        };
        let version =
            optional(SALESFORCE_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Ok(Arc::new(
            SalesforceRecordStore::new(instance_url, access_token).with_api_version(version),
        ))
    }

    fn web_search(&self) -> Result<Arc<dyn WebSearchPort>, ConfigError> {
        let api_key = required(SEARCH_API_KEY)?;
        let endpoint = url(
            SEARCH_API_URL,
            optional(SEARCH_API_URL).unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
        )?;
        Ok(Arc::new(TavilySearch::new(api_key).with_url(endpoint)))
    }

    fn document_index(&self) -> Result<Arc<dyn DocumentIndexPort>, ConfigError> {
        let base_url = url(INDEX_API_URL, required(INDEX_API_URL)?)?;
        let api_key = required(INDEX_API_KEY)?;
        let namespace =
            optional(INDEX_NAMESPACE).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        Ok(Arc::new(
            HttpDocumentIndex::new(base_url, api_key).with_namespace(namespace),
        ))
    }
}
