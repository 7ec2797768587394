//! Capability domain entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::DomainError;

/// Separator between provider name and local capability name.
pub const QUALIFIED_SEPARATOR: &str = "__";

/// Build the globally unique name `provider__local`.
pub fn qualified_name(provider: &str, local: &str) -> String {
    format!("{}{}{}", provider, QUALIFIED_SEPARATOR, local)
}

/// How to launch a tool provider process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Unique provider name, used as the qualified-name prefix
    pub name: String,
    /// Executable to spawn
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overlay applied on top of the inherited environment
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Check that the name keeps qualified names unambiguous.
    ///
    /// Allowed: ASCII letters, digits, `-` and `_`, with no `__` run and no
    /// leading or trailing `_` (`a_` + `_x` would collide with `a` + `__x`).
    pub fn validate(&self) -> Result<(), DomainError> {
        let valid_chars = self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if self.name.is_empty()
            || !valid_chars
            || self.name.contains(QUALIFIED_SEPARATOR)
            || self.name.starts_with('_')
            || self.name.ends_with('_')
        {
            return Err(DomainError::InvalidProviderName(self.name.clone()));
        }
        if self.command.trim().is_empty() {
            return Err(DomainError::EmptyInput("provider command"));
        }
        Ok(())
    }
}

/// One named, schema-described operation a provider exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    /// Name as advertised by the provider
    pub local_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    pub provider_name: String,
    /// `provider__local`, unique across all providers
    pub qualified_name: String,
}

impl Capability {
    pub fn new(
        provider_name: impl Into<String>,
        local_name: impl Into<String>,
        description: Option<String>,
        input_schema: Option<serde_json::Value>,
    ) -> Self {
        let provider_name = provider_name.into();
        let local_name = local_name.into();
        Self {
            qualified_name: qualified_name(&provider_name, &local_name),
            local_name,
            description,
            input_schema,
            provider_name,
        }
    }

    /// View of this capability in the shape tool-calling APIs expect.
    pub fn to_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.qualified_name.clone(),
            description: self
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| {
                    format!(
                        "Tool {} provided by {}",
                        self.local_name, self.provider_name
                    )
                }),
            input_schema: self
                .input_schema
                .clone()
                .unwrap_or_else(empty_object_schema),
        }
    }
}

/// `{"type": "object", "properties": {}}`
pub fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// Tool definition handed to the completion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Outcome of invoking a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityOutput {
    /// Text content joined for the model
    pub text: String,
    /// The provider flagged the call as failed
    pub is_error: bool,
    /// Provider payload as returned
    pub raw: serde_json::Value,
}

/// Connection summary for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub connected: bool,
    pub capability_count: usize,
}
