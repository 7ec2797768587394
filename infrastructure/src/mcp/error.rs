//! Error types for the tool provider client

use thiserror::Error;

/// Result type alias for provider protocol operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when talking to a tool provider process
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn provider '{provider}': {source}")]
    Spawn {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Handshake failed: {reason}")]
    Handshake { reason: String },

    #[error("Request '{method}' timed out")]
    Timeout { method: String },

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Provider process terminated")]
    ProviderTerminated,

    #[error("Client disconnected")]
    Disconnected,

    #[error("Client is not connected")]
    NotConnected,

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// The provider can no longer serve requests on this connection
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            McpError::ProviderTerminated | McpError::Disconnected | McpError::NotConnected
        )
    }
}
