//! CLI entrypoint for toolbridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection, then serves the HTTP API until Ctrl-C.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use toolbridge_application::{CapabilityRegistryPort, ConversationLogger, NoConversationLogger};
use toolbridge_domain::QueryTranslator;
use toolbridge_infrastructure::{
    ConfigLoader, EnvVendorFactory, FileConfig, JsonlConversationLogger, ProviderRegistry,
};
use toolbridge_presentation::{AppState, Cli, router};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_FILE_PREFIX: &str = "toolbridge.log";

/// Console logging, plus a daily rolling file when `--log-dir` is given.
///
/// The returned guard flushes the file writer on drop and must outlive the server.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    // -v wins over RUST_LOG; with neither, only warnings
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            error!("Config: {}", issue);
        }
        bail!("invalid configuration ({} problem(s))", issues.len());
    }
    Ok(config)
}

fn conversation_logger(config: &FileConfig) -> Result<Arc<dyn ConversationLogger>> {
    match &config.logging.conversation_log {
        Some(path) => {
            let logger = JsonlConversationLogger::open(path)
                .with_context(|| format!("opening conversation log {}", path.display()))?;
            info!(path = %path.display(), "Conversation log enabled");
            Ok(Arc::new(logger))
        }
        None => Ok(Arc::new(NoConversationLogger)),
    }
}

/// Register the configured providers; a failing one is logged and skipped.
async fn autostart(registry: &ProviderRegistry, config: &FileConfig) {
    for provider in config.autostart_providers() {
        match registry.register_provider(provider.to_spec()).await {
            Ok(capabilities) => info!(
                provider = %provider.name,
                capabilities = capabilities.len(),
                "Provider registered"
            ),
            Err(e) => warn!(provider = %provider.name, "Provider not started: {}", e),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);

    let config = load_config(&cli)?;
    let addr = config.server.socket_addr()?;

    info!("Starting toolbridge {}", env!("CARGO_PKG_VERSION"));

    // === Dependency Injection ===
    let registry =
        Arc::new(ProviderRegistry::new().with_request_timeout(config.server.provider_timeout()));
    let translator = Arc::new(QueryTranslator::new().context("building query rules")?);

    let state = AppState::new(registry.clone(), Arc::new(EnvVendorFactory), translator)
        .with_execution(config.chat.to_execution_params())
        .with_conversation_logger(conversation_logger(&config)?);

    if cli.no_autostart {
        info!("Provider autostart disabled");
    } else {
        autostart(&registry, &config).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, cors = config.server.cors, "HTTP server listening");

    let served = axum::serve(listener, router(state, config.server.cors))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    registry.teardown_all().await;
    info!("Providers torn down");

    served.context("HTTP server failed")
}
