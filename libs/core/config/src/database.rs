use crate::{env_parse_or, env_required, ConfigError, FromEnv};

/// PostgreSQL connection settings for the user store
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 10,
        }
    }

    /// Loads the config only when `DATABASE_URL` is set.
    ///
    /// `Ok(None)` means the caller should fall back to an in-process store.
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        if std::env::var_os("DATABASE_URL").is_none() {
            return Ok(None);
        }
        Self::from_env().map(Some)
    }
}

impl FromEnv for DatabaseConfig {
    /// Requires DATABASE_URL; DATABASE_MAX_CONNECTIONS defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse_or("DATABASE_MAX_CONNECTIONS", 10u32)?,
        })
    }
}
