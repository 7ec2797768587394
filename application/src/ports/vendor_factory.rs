//! Vendor factory port
//!
//! Vendor adapters are built per request so that credential changes in the
//! environment take effect without a restart.

use super::completion::CompletionGateway;
use super::document_index::DocumentIndexPort;
use super::record_store::RecordStorePort;
use super::web_search::WebSearchPort;
use std::sync::Arc;
use thiserror::Error;

/// Vendor configuration problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {name}")]
    MissingVariable { name: &'static str },

    #[error("Invalid value for {name}: {reason}")]
    InvalidVariable { name: &'static str, reason: String },
}

pub trait VendorFactory: Send + Sync {
    fn completion(&self) -> Result<Arc<dyn CompletionGateway>, ConfigError>;

    /// `access_token` overrides the configured token when a caller forwards one.
    fn record_store(&self, access_token: Option<&str>) -> Result<Arc<dyn RecordStorePort>, ConfigError>;

    fn web_search(&self) -> Result<Arc<dyn WebSearchPort>, ConfigError>;

    fn document_index(&self) -> Result<Arc<dyn DocumentIndexPort>, ConfigError>;
}
