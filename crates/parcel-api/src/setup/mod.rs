//! Application setup and initialization
//!
//! Startup order: validate configuration, initialize telemetry, build the
//! storage backend, then wire state and routes.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use parcel_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_json())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let storage = parcel_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    let state = Arc::new(AppState::new(&config, storage));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
