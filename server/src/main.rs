//! coinrate Server Binary
//!
//! Refreshes fiat/crypto rates in the background and serves conversions over HTTP.

use tokio::net::TcpListener;
use tracing::{error, info};

use coinrate_server::{api, build_service, init_tracing, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Load configuration
    let config = ServiceConfig::from_env()?;
    init_tracing(&config.log_level);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(app = %config.app_name, "Starting coinrate");

    let service = build_service(&config).await?;

    // The cache must be populated before the first request is served.
    service.start().await?;

    let listener = TcpListener::bind((config.http_addr.as_str(), config.http_port)).await?;
    info!(
        http_addr = %config.http_addr,
        http_port = config.http_port,
        "HTTP server listening"
    );

    axum::serve(listener, api::router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.stop().await;

    info!("coinrate shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
