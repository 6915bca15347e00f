//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use crate::state::AppState;
use std::sync::Arc;
use swapit_feed_core::source::HttpListingSource;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, watch};

/// Completes when SIGTERM or SIGINT (Ctrl+C) arrives, then flips
/// `shutdown_tx` so background tasks and open WebSockets wind down.
pub async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            return wait_for_ctrl_c(shutdown_tx).await;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGINT handler");
            return wait_for_ctrl_c(shutdown_tx).await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
    let _ = shutdown_tx.send(true);
}

async fn wait_for_ctrl_c(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    let _ = shutdown_tx.send(true);
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// The ingest secret, the listing source endpoint and the feed defaults are
/// swapped in place. Listen address and storage backend need a restart.
///
/// Returns a Notify that stops the task.
pub fn spawn_config_reload_handler(
    state: AppState,
    config_loader: Arc<ConfigLoader>,
    listing_source: Arc<HttpListingSource>,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, config reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => {
                            if let Err(e) = listing_source.reconfigure(&loaded_config.listing_source).await {
                                tracing::error!(error = %e, "Failed to rebuild listing source client, keeping previous configuration");
                                continue;
                            }
                            *state.config.ingest.write().await = loaded_config.ingest;
                            *state.config.listing_source.write().await = loaded_config.listing_source;
                            *state.config.feed.write().await = loaded_config.feed;
                            tracing::info!("Configuration reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload configuration, keeping previous");
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
