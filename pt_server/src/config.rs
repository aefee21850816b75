//! Server configuration management.
//!
//! Consolidates environment variable reads and CLI overrides into one
//! validated configuration.

use poomsae_tournament::db::DatabaseConfig;
use std::net::SocketAddr;
use thiserror::Error;

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Run on the in-memory repository instead of Postgres
    pub use_memory: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

impl ServerConfig {
    /// Load configuration from environment variables, applying CLI
    /// overrides where given.
    ///
    /// Environment:
    /// - `SERVER_BIND`: HTTP bind address (default `127.0.0.1:7788`)
    /// - `METRICS_BIND`: Prometheus bind address (unset = disabled)
    /// - `DATABASE_URL` and the `DB_*` pool variables
    /// - `STORAGE`: `memory` to run without Postgres
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory_override: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_addr_env("SERVER_BIND")?.unwrap_or_else(|| {
                "127.0.0.1:7788"
                    .parse()
                    .expect("default bind address is valid")
            }),
        };

        let metrics_bind = parse_addr_env("METRICS_BIND")?;

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let use_memory = memory_override
            || std::env::var("STORAGE")
                .map(|v| v.eq_ignore_ascii_case("memory"))
                .unwrap_or(false);

        Ok(Self {
            bind,
            metrics_bind,
            database,
            use_memory,
        })
    }
}

fn parse_addr_env(var: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(None),
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
            }),
    }
}
