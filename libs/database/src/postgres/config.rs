use core_config::{ConfigError, FromEnv, env_optional, env_parse, env_required};
use sea_orm::ConnectOptions;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Connection pool settings for PostgreSQL
///
/// Environment variables:
/// - `DATABASE_URL` (required)
/// - `DB_MAX_CONNECTIONS` (default: 20)
/// - `DB_MIN_CONNECTIONS` (default: 2)
/// - `DB_CONNECT_TIMEOUT_SECS` (default: 8)
/// - `DB_IDLE_TIMEOUT_SECS` (default: 300)
/// - `DB_SQLX_LOGGING` (default: false)
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 8,
            idle_timeout_secs: 300,
            sqlx_logging: false,
        }
    }

    /// `Ok(None)` when `DATABASE_URL` is not configured
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        match env_optional("DATABASE_URL") {
            Some(_) => Self::from_env().map(Some),
            None => Ok(None),
        }
    }

    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url);
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        opt
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::new(env_required("DATABASE_URL")?);

        Ok(Self {
            max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_parse("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env_parse(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            idle_timeout_secs: env_parse("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            sqlx_logging: env_parse("DB_SQLX_LOGGING", defaults.sqlx_logging)?,
            ..defaults
        })
    }
}
