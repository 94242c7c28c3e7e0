//! Asset store setup.

use anyhow::{Context, Result};
use partvault_core::Config;
use partvault_storage::{AssetStore, LocalAssetStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn AssetStore>> {
    let store = LocalAssetStore::new(&config.storage_path)
        .await
        .with_context(|| format!("Failed to initialize asset store at {}", config.storage_path))?;

    tracing::info!(storage_path = %config.storage_path, "Asset store ready");

    Ok(Arc::new(store))
}
