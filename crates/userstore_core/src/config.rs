//! Store configuration.
//!
//! # Responsibility
//! - Describe how the connection provider reaches the database file.
//! - Load overrides from process environment for the CLI/bootstrap path.
//!
//! # Invariants
//! - A validated config has a non-empty database path and a pool of at
//!   least one connection.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "USERSTORE_DB_PATH";
pub const ENV_POOL_SIZE: &str = "USERSTORE_POOL_SIZE";
pub const ENV_BUSY_TIMEOUT_MS: &str = "USERSTORE_BUSY_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "userstore.sqlite3";
const DEFAULT_POOL_MAX_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Connection settings consumed by `db::open_pool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Parent directories are created on open.
    pub database_path: PathBuf,
    /// Upper bound of pooled connections.
    pub pool_max_size: u32,
    /// How long a connection waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Creates defaults pointing at `database_path`.
    pub fn with_path(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    /// Builds a config from defaults plus `USERSTORE_*` environment overrides.
    ///
    /// # Errors
    /// - Returns an error when a numeric variable cannot be parsed.
    /// - Returns an error when the resulting config fails `validate()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.database_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(ENV_POOL_SIZE) {
            config.pool_max_size = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: ENV_POOL_SIZE,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms =
                raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_BUSY_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks values the connection provider cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if self.pool_max_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Configuration loading/validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDatabasePath,
    ZeroPoolSize,
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDatabasePath => write!(f, "database path cannot be empty"),
            Self::ZeroPoolSize => write!(f, "pool size must be at least 1"),
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a non-negative integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_POOL_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn overrides_are_read_from_lookup() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/users.db "),
            (ENV_POOL_SIZE, "2"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/users.db"));
        assert_eq!(config.pool_max_size, 2);
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_POOL_SIZE, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroPoolSize);
    }

    #[test]
    fn malformed_number_names_the_variable() {
        let err =
            StoreConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BUSY_TIMEOUT_MS));
    }
}
