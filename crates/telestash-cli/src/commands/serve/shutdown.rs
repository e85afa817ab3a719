use tracing::{info, warn};

/// Resolves when the process receives Ctrl+C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until killed
        warn!("Failed to listen for ctrl-c signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Received Ctrl+C, initiating graceful shutdown...");
}
