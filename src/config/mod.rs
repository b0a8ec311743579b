//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::str::FromStr;

use argon2::Params;

use crate::error::ErrorPolicy;

/// Development-only signing secret used when `JWT_SECRET` is unset.
pub const DEFAULT_JWT_SECRET: &str = "credentials_jwt_secret_change_in_production";

/// Where account records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigLoadError::InvalidStoreBackend(other.to_string())),
        }
    }
}

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`). `PORT` overrides the port.
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// `postgres` or `memory`.
    pub store_backend: StoreBackend,
    /// Token signing secret.
    pub jwt_secret: String,
    /// How register/login failures map to HTTP statuses.
    pub error_policy: ErrorPolicy,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    /// Argon2 iterations.
    pub hash_iterations: u32,
    /// Argon2 lanes.
    pub hash_parallelism: u32,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let mut server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;
        if let Some(port) = lookup("PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigLoadError::InvalidPort)?;
            server_addr.set_port(port);
        }

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost:5432/credentials".to_string());
        let store_backend = lookup("STORE_BACKEND")
            .map(|s| s.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        if jwt_secret.is_empty() {
            return Err(ConfigLoadError::EmptyJwtSecret);
        }
        let error_policy = match lookup("ERROR_POLICY") {
            Some(s) => s
                .parse::<ErrorPolicy>()
                .map_err(ConfigLoadError::InvalidErrorPolicy)?,
            None => ErrorPolicy::default(),
        };

        let hash_memory_kib = parse_u32(&lookup, "HASH_MEMORY_KIB", Params::DEFAULT_M_COST)?;
        let hash_iterations = parse_u32(&lookup, "HASH_ITERATIONS", Params::DEFAULT_T_COST)?;
        let hash_parallelism = parse_u32(&lookup, "HASH_PARALLELISM", Params::DEFAULT_P_COST)?;
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            store_backend,
            jwt_secret,
            error_policy,
            hash_memory_kib,
            hash_iterations,
            hash_parallelism,
            log_level,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_u32<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v.parse().map_err(|_| ConfigLoadError::InvalidNumber(key)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid PORT")]
    InvalidPort,
    #[error("Invalid STORE_BACKEND: {0}")]
    InvalidStoreBackend(String),
    #[error("Invalid ERROR_POLICY: {0}")]
    InvalidErrorPolicy(String),
    #[error("JWT_SECRET must not be empty")]
    EmptyJwtSecret,
    #[error("Invalid number in {0}")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigLoadError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 3000);
        assert_eq!(config.database_url, "postgres://localhost:5432/credentials");
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.error_policy, ErrorPolicy::Compatible);
        assert_eq!(config.hash_memory_kib, Params::DEFAULT_M_COST);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn port_overrides_server_addr_port() {
        let config = load(&[("SERVER_ADDR", "127.0.0.1:8080"), ("PORT", "4000")]).unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:4000");
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/creds"),
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("ERROR_POLICY", "hardened"),
            ("HASH_ITERATIONS", "3"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/creds");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.error_policy, ErrorPolicy::Hardened);
        assert_eq!(config.hash_iterations, 3);
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(load(&[("PORT", "http")]), Err(ConfigLoadError::InvalidPort)));
        assert!(matches!(
            load(&[("STORE_BACKEND", "mongo")]),
            Err(ConfigLoadError::InvalidStoreBackend(_))
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "")]),
            Err(ConfigLoadError::EmptyJwtSecret)
        ));
        assert!(matches!(
            load(&[("HASH_MEMORY_KIB", "lots")]),
            Err(ConfigLoadError::InvalidNumber("HASH_MEMORY_KIB"))
        ));
    }
}
