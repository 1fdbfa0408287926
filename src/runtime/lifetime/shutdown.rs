use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// 等待 Ctrl+C 信号
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// Spawn a Ctrl+C listener and return a receiver that flips to `true` on it
///
/// Used by the dashboard polling loop.
pub fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        listen_for_shutdown().await;
        let _ = tx.send(true);
    });
    rx
}
