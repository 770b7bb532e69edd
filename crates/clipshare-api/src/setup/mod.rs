//! Application setup and initialization
//!
//! Wires configuration into the record store, blob storage, services and
//! routes. Kept out of main.rs so tests can build the same router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod sweeper;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use clipshare_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let records = database::setup_record_store(&config).await?;

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, records, storage)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
