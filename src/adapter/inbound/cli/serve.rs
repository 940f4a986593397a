//! Handler for the `serve` command.

use futures_util::future::join_all;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::Hub;
use crate::infrastructure::config::settings::Config;

/// Load every manager, then keep reloading until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the database cannot be opened or the first load
/// fails.
pub async fn execute(config: &Config) -> Result<()> {
    let hub = Hub::from_config(config)?;
    hub.load_all()?;
    output::success(&format!(
        "Loaded {} chains, {} tokens",
        hub.chains.get_all_chains().len(),
        hub.tokens.get_all_tokens().len()
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = hub.spawn_reloads(config, shutdown_rx);
    info!(tasks = handles.len(), "chainhub serving");

    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
    for result in join_all(handles).await {
        if let Err(e) = result {
            error!(error = %e, "Reload task ended abnormally");
        }
    }
    info!("chainhub stopped");
    Ok(())
}
