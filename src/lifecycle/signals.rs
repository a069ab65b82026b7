//! Shutdown signal sources.

use tokio::sync::broadcast;

/// Resolve when either Ctrl+C arrives or the broadcast fires.
///
/// A closed or lagged channel also counts as a shutdown request.
pub async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
