//! Plan Catalog Server
//!
//! Main entry point for the internet plan catalog and recommendation service.

use anyhow::{Context, Result};
use clap::Parser;
use plan_advisor_shared::ScoreWeights;
use plan_catalog::{
    config::{Args, PlanCatalogConfig},
    fixtures,
    handlers::{create_router, AppState},
    repository::{MemoryPlanRepository, PlanRepository},
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Telemetry and observability setup
mod telemetry {
    use anyhow::{Context, Result};
    use plan_catalog::config::PlanCatalogConfig;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    /// Initialize tracing and logging; RUST_LOG wins over the configured level
    pub fn init_tracing(config: &PlanCatalogConfig) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .context("Invalid log level")?;

        let fmt_layer = match config.logging.format.as_str() {
            "json" => fmt::layer().json().boxed(),
            "compact" => fmt::layer().compact().boxed(),
            _ => fmt::layer().pretty().boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(())
    }
}

/// Graceful shutdown handling
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
            Ok(mut stream) => {
                stream.recv().await;
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

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config = Arc::new(PlanCatalogConfig::load(&args)?);

    // Initialize telemetry
    telemetry::init_tracing(&config)?;

    info!(
        "Starting Plan Catalog Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration loaded from: {:?}", args.config);

    // Seed the catalog
    let plans = match &config.catalog.seed_file {
        Some(path) => fixtures::load_seed_file(path)?,
        None => fixtures::default_plans(),
    };
    let repository = Arc::new(
        MemoryPlanRepository::new(plans).context("Failed to initialize plan catalog")?,
    );
    info!("Catalog ready with {} plans", repository.count());

    let state = AppState::new(Arc::clone(&config), repository);

    let weights = state.recommendations.weights();
    if weights.total() != ScoreWeights::MAX_SCORE {
        warn!(
            total = weights.total(),
            "Score weights do not add up to {}; scores are clamped",
            ScoreWeights::MAX_SCORE
        );
    }

    let app = create_router(state);

    // Start the HTTP server
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to server address")?;

    info!("Plan Catalog Server listening on {}", addr);
    info!("Web UI: http://{}/", addr);
    info!("Health endpoint: http://{}/health", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed to start")?;

    info!("Plan Catalog Server shutdown complete");
    Ok(())
}
