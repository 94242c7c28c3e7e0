//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs so the test
//! suite can build the same application against temporary resources.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use partvault_core::Config;
use std::sync::Arc;

/// Initialize the entire application: database, storage, state, routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;
    let store = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), pool, store));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
