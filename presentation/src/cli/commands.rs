//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for toolbridge
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(author, version, about = "HTTP bridge between LLMs, local tool providers and CRM data")]
#[command(long_about = r#"
toolbridge serves a JSON HTTP API that translates free text into SOQL,
runs tool-calling chats against local tool providers, answers from a
document index and summarizes web search results.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/toolbridge/config.toml   Global config
2. ./toolbridge.toml                  Project-level config
3. --config <path>                    Explicit config file
4. TOOLBRIDGE_* environment variables (e.g. TOOLBRIDGE_SERVER__BIND)

Vendor credentials (COMPLETION_API_KEY, SALESFORCE_ACCESS_TOKEN, ...) are
read from the environment on each request.

Example:
  toolbridge --bind 0.0.0.0:8080 -v
  toolbridge --config ./bridge.toml --no-autostart --log-dir ./logs
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides server.bind)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Do not register the configured providers at startup
    #[arg(long)]
    pub no_autostart: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
