use serde::Deserialize;

use crate::libs::error::{MigrationError, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }

    /// Reads `DATABASE_URL` and, optionally, `DATABASE_MAX_CONNECTIONS`.
    /// Returns `Ok(None)` when no URL is set.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(database_url) = lookup("DATABASE_URL") else {
            return Ok(None);
        };
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                MigrationError::InvalidConfig(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive integer, got `{raw}`"
                ))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let config = Self {
            database_url,
            max_connections,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };
        config.validate()?;
        Ok(Some(config))
    }

    /// sqlx panics on an empty pool, so zero connections is refused here.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(MigrationError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.starts_with("sqlite::memory:") || self.database_url.contains("mode=memory")
    }
}
