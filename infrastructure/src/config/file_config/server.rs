//! Server configuration from TOML (`[server]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Listen address (default: "127.0.0.1:8080")
    pub bind: String,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
    /// Seconds to wait for a provider's reply to one request
    pub provider_timeout_secs: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            cors: false,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl FileServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigValidationError::InvalidBind(self.bind.clone()))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
