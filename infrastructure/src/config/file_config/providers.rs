//! Tool provider configuration from TOML (`[[providers]]` array)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use toolbridge_domain::ProviderSpec;

fn default_true() -> bool {
    true
}

/// One tool provider process to register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProviderConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Register at startup (default: true)
    #[serde(default = "default_true")]
    pub autostart: bool,
}

impl FileProviderConfig {
    pub fn to_spec(&self) -> ProviderSpec {
        ProviderSpec {
            name: self.name.clone(),
            command: self.command.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }
}
