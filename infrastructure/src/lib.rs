//! Infrastructure layer for toolbridge
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the tool provider protocol client and registry, the
//! HTTP vendor gateways, configuration file loading and conversation logging.

pub mod config;
pub mod env;
pub mod logging;
pub mod mcp;
pub mod vendors;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig,
    FileProviderConfig, FileServerConfig,
};
pub use env::EnvVendorFactory;
pub use logging::JsonlConversationLogger;
pub use mcp::{
    client::{NotificationObserver, ProtocolClient, TracingObserver},
    error::McpError,
    registry::ProviderRegistry,
};
pub use vendors::{HttpDocumentIndex, OpenAiCompletionGateway, SalesforceRecordStore, TavilySearch};
