//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use castline_core::{Config, EncryptionService};
use castline_publishers::{HttpTokenRefresher, PublisherRegistry};
use std::sync::Arc;

/// Initialize the entire application over Postgres and the configured storage backend
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_json())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let encryption = EncryptionService::from_base64(config.encryption_key().unwrap_or_default())
        .context("Failed to initialize credential encryption")?;
    let stores = services::Stores::postgres(pool, encryption);

    let storage = storage::setup_storage(&config).await?;

    let registry = PublisherRegistry::from_config(&config)
        .await
        .context("Failed to build publisher registry")?;
    tracing::info!(platforms = ?registry.list().await, "Platform adapters registered");

    let refresher = Arc::new(
        HttpTokenRefresher::from_config(&config).context("Failed to build OAuth client")?,
    );

    let state = services::build_state(&config, stores, storage, registry, refresher);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
