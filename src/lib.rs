pub mod api; // HTTP surface: search + health
pub mod config;
pub mod db;
pub mod lookup; // Phone / card matcher
pub mod models;
pub mod status; // Status badge classifier
pub mod store; // Appointment record store
pub mod verification; // Verify flow state machine

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiContext, ApiServer};
use crate::config::{AppConfig, ConfigError};
use crate::store::StoreError;
use crate::verification::Verifier;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Initialize tracing from `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Open the configured store and start the API server.
pub async fn serve(config: &AppConfig) -> Result<ApiServer, StartupError> {
    let store = store::open_store(config)?;
    let verifier = Verifier::new(Arc::clone(&store), config.search_latency);
    let ctx = ApiContext::new(verifier, config);

    api::start_api_server(ctx, config.bind_addr)
        .await
        .map_err(StartupError::Server)
}

/// Load configuration, open the store and serve the API until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        addr = %config.bind_addr,
        store = config.store_backend.as_str(),
        latency_ms = config.search_latency.as_millis() as u64,
        "{} starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let server = serve(&config).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.stop().await;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
