//! Catalog API - sneaker browsing REST server

use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod server;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics()?;

    info!(
        backend = %config.backend,
        cache_enabled = config.cache.enabled,
        cache_backend = %config.cache.backend,
        "Starting Catalog API"
    );

    let state = AppState::connect(config).await?;
    let app = api::routes(&state);

    info!("Catalog API listening on port {}", state.config.server.port);

    let store = state.store.clone();
    server::serve(app, &state.config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing store connections");
        store.close().await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
