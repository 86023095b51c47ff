//! Server configuration from environment variables.

use std::str::FromStr;
use std::time::Duration;

use nkowa_core::defaults::{
    DB_ACQUIRE_TIMEOUT_SECS, DB_MAX_CONNECTIONS, MAX_BODY_BYTES, SERVER_HOST, SERVER_PORT,
};
use nkowa_core::{Error, Result};
use nkowa_db::PoolConfig;

/// Where repositories keep their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown STORAGE_BACKEND '{}'. Expected postgres or memory",
                other
            ))),
        }
    }
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Required for the postgres backend.
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Raw `ALLOWED_ORIGINS` value; see [`crate::parse_allowed_origins`].
    pub allowed_origins: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            database_url: None,
            storage_backend: StorageBackend::Memory,
            db_max_connections: DB_MAX_CONNECTIONS,
            db_acquire_timeout_secs: DB_ACQUIRE_TIMEOUT_SECS,
            allowed_origins: None,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

/// Parse a numeric variable, falling back to `default` with a warning.
fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                subsystem = "config",
                key,
                value = %value,
                "Invalid numeric value, using default"
            );
            default
        }),
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::Postgres,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "DATABASE_URL is required when STORAGE_BACKEND=postgres".to_string(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            port: parse_or("PORT", lookup("PORT"), SERVER_PORT),
            database_url,
            storage_backend,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                DB_MAX_CONNECTIONS,
            ),
            db_acquire_timeout_secs: parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                DB_ACQUIRE_TIMEOUT_SECS,
            ),
            allowed_origins: lookup("ALLOWED_ORIGINS"),
            max_body_bytes: parse_or("MAX_BODY_BYTES", lookup("MAX_BODY_BYTES"), MAX_BODY_BYTES),
        })
    }

    /// Pool limits for the postgres backend.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_memory_backend_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.port, SERVER_PORT);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, MAX_BODY_BYTES);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let config =
            ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/nkowa")]))
                .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("PORT", "not-a-port"),
            ("DB_MAX_CONNECTIONS", "25"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.port, SERVER_PORT);
        assert_eq!(config.db_max_connections, 25);
        assert_eq!(config.db_acquire_timeout_secs, DB_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn test_pool_config_carries_limits() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(
            config.pool_config(),
            PoolConfig {
                max_connections: 4,
                acquire_timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "mongo")])).is_err());
    }
}
