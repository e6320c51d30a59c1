//! Portal Cache server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_cache::api::create_router;
use portal_cache::portal::RestBackend;
use portal_cache::{AppState, Config, SweepTasks};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the stores and bind them to the REST backend
/// 4. Start one expiry sweep task per store
/// 5. Serve HTTP until SIGINT/SIGTERM, then abort the sweeps
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portal Cache Server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        sweep_interval_secs = config.sweep_interval.as_secs(),
        dedupe_in_flight = config.dedupe_in_flight,
        "Configuration loaded"
    );

    let backend_url = config
        .backend_url
        .clone()
        .context("BACKEND_URL must be set")?;
    let backend = RestBackend::new(&backend_url, config.backend_api_key.clone().unwrap_or_default())?;
    info!(backend_url = %backend_url, "Backend client ready");

    let state = AppState::from_config(&config, Arc::new(backend));

    let sweeps = SweepTasks::spawn(state.portal.registry(), config.sweep_interval);
    info!(stores = sweeps.len(), "Background sweep tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeps))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeps.
async fn shutdown_signal(mut sweeps: SweepTasks) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeps.abort_all();
}
