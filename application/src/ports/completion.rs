//! Completion gateway port
//!
//! Defines the interface for communicating with a chat completion API.

use async_trait::async_trait;
use thiserror::Error;
use toolbridge_domain::{ChatMessage, LlmResponse, ToolDescriptor};

/// Errors raised by vendor adapters (completion, search, records, index)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-2xx answer from the vendor.
    #[error("{message}")]
    Upstream {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Build an upstream error, preferring the vendor's own message.
    pub fn upstream(operation: &'static str, status: u16, vendor_message: Option<String>) -> Self {
        let message = vendor_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("{} failed: {}", operation, status));
        GatewayError::Upstream {
            operation,
            status,
            message,
        }
    }
}

/// One call to the completion API.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call; empty disables tool use
    pub tools: Vec<ToolDescriptor>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Gateway for completion API calls
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, GatewayError>;
}
