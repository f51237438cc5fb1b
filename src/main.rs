use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sikati::cli::{self, Cli};
use sikati::client::ApiClient;
use sikati::session::FileStorage;
use sikati::startup::run_startup_checks;
use sikati::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = cli.load_config()?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.command.is_some() {
        return cli::run_command(&cli).await;
    }

    tracing::info!("Starting Sikati v{}", env!("CARGO_PKG_VERSION"));

    let api = ApiClient::new(&config.api)?;

    if cli.skip_checks {
        tracing::warn!("Startup checks skipped");
    } else {
        let report = run_startup_checks(&config, &api).await;
        if !report.all_critical_passed {
            anyhow::bail!("Startup checks failed: {}", report.summary);
        }
    }

    // Persisted sessions survive restarts
    let storage = Arc::new(FileStorage::open(
        config.session_storage_file(),
        config.session.max_age(),
    )?);

    let mut state = AppState::new(config.clone(), api, storage);
    match sikati::api::metrics::init_metrics() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => tracing::warn!(error = %e, "Metrics exporter unavailable"),
    }
    let state = Arc::new(state);

    let app = sikati::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Site listening on http://{}", addr);
    tracing::info!("Backend API at {}", config.api.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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

    tracing::info!("Shutdown signal received");
}
