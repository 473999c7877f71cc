//! Storage setup and initialization

use anyhow::{Context, Result};
use castline_core::Config;
use castline_storage::{create_storage, StorageHandle};

pub async fn setup_storage(config: &Config) -> Result<StorageHandle> {
    tracing::info!("Initializing storage abstraction...");
    let handle = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?handle.storage.backend_type(),
        signed_object_route = handle.local.is_some(),
        "Storage abstraction initialized successfully"
    );
    Ok(handle)
}
