//! RSI Alerts Strategy Main Entry Point

use anyhow::{Context, Result};
use rsi_alerts::logging::init_logging;
use rsi_alerts::{ReqwestTransport, RsiAlertConfig, RsiAlertStrategy};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("rsi_alerts_service")?;

    info!("Starting Torq RSI Alerts Strategy");

    // Load configuration
    let config = RsiAlertConfig::load().context("Failed to load RSI alerts configuration")?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e).context("RSI alerts configuration rejected");
    }

    info!(
        "Configuration loaded: monitoring {} symbols via categories {:?}",
        config.symbols.len(),
        config.exchange.categories
    );

    let transport = Arc::new(ReqwestTransport::new().context("Failed to build HTTP client")?);
    let mut strategy = RsiAlertStrategy::new(config, transport)
        .context("Failed to create RSI alert strategy")?;

    // Register the Ctrl+C listener before the first tick
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                // Keep the sender alive so the loop is not stopped by the failure
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    info!("RSI Alerts Strategy running. Press Ctrl+C to stop.");

    strategy
        .start(async {
            let _ = shutdown_rx.await;
        })
        .await;

    let stats = strategy.stats();
    info!(
        "Shutting down RSI Alerts Strategy: {} ticks, {} alerts, {} notification failures",
        stats.ticks, stats.alerts_fired, stats.notification_failures
    );

    Ok(())
}
