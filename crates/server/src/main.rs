use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enricher_core::{
    load_config, validate_config, BatchProcessor, BlockscoutConfig, BlockscoutSource,
    ChainRegistry, LookupSource, RecordStore,
};
use enricher_server::api::create_router;
use enricher_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ENRICHER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("enricher.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Enrichment: {} concurrent lookups, {} attempts, {}ms retry delay",
        config.enrichment.effective_concurrency(),
        config.enrichment.retry.max_attempts,
        config.enrichment.retry.delay_ms
    );

    // Chain table
    let registry = Arc::new(ChainRegistry::with_overrides(&config.chains));
    info!("Chain registry initialized with {} chains", registry.len());

    // Explorer client
    let source: Arc<dyn LookupSource> = Arc::new(
        BlockscoutSource::new(BlockscoutConfig {
            timeout_secs: config.enrichment.request_timeout_secs,
            ..Default::default()
        })
        .context("Failed to create Blockscout client")?,
    );

    let processor = BatchProcessor::new(config.enrichment.clone(), registry, source);

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), processor, RecordStore::new()));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
