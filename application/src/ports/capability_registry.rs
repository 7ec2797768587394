//! Capability registry port
//!
//! Defines the interface to the set of connected tool providers. The
//! implementation owns one protocol client per provider and routes
//! invocations by qualified capability name.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use toolbridge_domain::{Capability, CapabilityOutput, ProviderSpec, ProviderStatus, ToolDescriptor};

/// Errors from provider registration and capability invocation
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    /// Spawn, handshake or discovery failed; the provider was not registered.
    #[error("Failed to register provider '{provider}': {reason}")]
    RegistrationFailed { provider: String, reason: String },

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Provider '{0}' is not connected")]
    ProviderNotConnected(String),

    #[error("Request '{method}' to provider '{provider}' timed out")]
    Timeout { provider: String, method: String },

    #[error("Capability '{capability}' failed: {reason}")]
    InvocationFailed { capability: String, reason: String },
}

impl RegistryError {
    /// Check if the error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, RegistryError::Timeout { .. })
    }
}

#[async_trait]
pub trait CapabilityRegistryPort: Send + Sync {
    /// Connect a provider and record the capabilities it advertises.
    ///
    /// A provider already registered under the same name is torn down first.
    async fn register_provider(&self, spec: ProviderSpec) -> Result<Vec<Capability>, RegistryError>;

    /// All capabilities, grouped by provider in registration order.
    async fn list_capabilities(&self) -> Vec<Capability>;

    /// Capabilities in the shape tool-calling APIs expect.
    async fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.list_capabilities()
            .await
            .iter()
            .map(Capability::to_descriptor)
            .collect()
    }

    async fn invoke(
        &self,
        qualified_name: &str,
        arguments: serde_json::Value,
    ) -> Result<CapabilityOutput, RegistryError>;

    async fn status(&self) -> BTreeMap<String, ProviderStatus>;

    /// Disconnect every provider and forget all capabilities.
    async fn teardown_all(&self);
}
