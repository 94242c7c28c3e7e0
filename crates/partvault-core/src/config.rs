//! Configuration module
//!
//! Environment-driven configuration for the API binary and services. Values
//! come from the process environment (optionally seeded from `.env` by the
//! binary); every field has a development-friendly default.

use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_path: String,
    pub max_upload_size_bytes: usize,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = parse_var("SERVER_PORT", DEFAULT_PORT)?;
        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://partvault.db".to_string());
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let db_timeout_seconds = parse_var("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?;
        let storage_path = env::var("STORAGE_PATH").unwrap_or_else(|_| "./data/cad".to_string());
        let max_upload_size_bytes = parse_var("MAX_UPLOAD_SIZE_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_port,
            cors_origins,
            database_url,
            db_max_connections,
            db_timeout_seconds,
            storage_path,
            max_upload_size_bytes,
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
