//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Vendor credentials are not part of
//! it; they come from the environment (see [`crate::env`]).

mod chat;
mod providers;
mod server;

pub use chat::FileChatConfig;
pub use providers::FileProviderConfig;
pub use server::{DEFAULT_BIND, DEFAULT_PROVIDER_TIMEOUT_SECS, FileServerConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("server.bind is not a socket address: {0}")]
    InvalidBind(String),

    #[error("chat.temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("chat.max_tokens cannot be 0")]
    ZeroMaxTokens,

    #[error("server.provider_timeout_secs cannot be 0")]
    ZeroProviderTimeout,

    #[error("provider '{name}': {reason}")]
    InvalidProvider { name: String, reason: String },

    #[error("provider '{0}' is defined more than once")]
    DuplicateProvider(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation transcript; disabled when unset
    pub conversation_log: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub logging: FileLoggingConfig,
    pub chat: FileChatConfig,
    pub providers: Vec<FileProviderConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if let Err(e) = self.server.socket_addr() {
            issues.push(e);
        }
        if self.server.provider_timeout_secs == 0 {
            issues.push(ConfigValidationError::ZeroProviderTimeout);
        }

        if let Some(temperature) = self.chat.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            issues.push(ConfigValidationError::InvalidTemperature(temperature));
        }
        if self.chat.max_tokens == Some(0) {
            issues.push(ConfigValidationError::ZeroMaxTokens);
        }

        let mut names = HashSet::new();
        for provider in &self.providers {
            if let Err(e) = provider.to_spec().validate() {
                issues.push(ConfigValidationError::InvalidProvider {
                    name: provider.name.clone(),
                    reason: e.to_string(),
                });
            }
            if !names.insert(provider.name.as_str()) {
                issues.push(ConfigValidationError::DuplicateProvider(
                    provider.name.clone(),
                ));
            }
        }

        issues
    }

    /// Providers to register at startup, in file order.
    pub fn autostart_providers(&self) -> impl Iterator<Item = &FileProviderConfig> {
        self.providers.iter().filter(|p| p.autostart)
    }
}
