//! Database pool setup and migration.

use anyhow::{Context, Result};
use partvault_core::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid database URL: {}", config.database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    partvault_db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!(database_url = %config.database_url, "Database ready");

    Ok(pool)
}
