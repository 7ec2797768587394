//! Configuration file loading for toolbridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOLBRIDGE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolbridge.toml`
//! 4. Global: `$XDG_CONFIG_HOME/toolbridge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BIND, DEFAULT_PROVIDER_TIMEOUT_SECS, FileChatConfig, FileConfig,
    FileLoggingConfig, FileProviderConfig, FileServerConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
