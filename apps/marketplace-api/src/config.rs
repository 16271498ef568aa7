//! Configuration for the Marketplace API

use axum_helpers::JwtConfig;
use core_config::{
    app_info, env_optional, env_or_default, env_parse, server::ServerConfig, AppInfo, ConfigError,
    FromEnv,
};
use database::postgres::PostgresConfig;
use domain_notifications::NotificationConfig;
use std::fmt;
use std::path::PathBuf;

pub use core_config::Environment;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Where product images land and how large an upload may be
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl FromEnv for UploadConfig {
    /// - `UPLOAD_DIR`: defaults to `uploads`
    /// - `MAX_UPLOAD_BYTES`: defaults to 5 MiB
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dir: PathBuf::from(env_or_default("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            max_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

/// Admin account created at startup when `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set
#[derive(Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminAccount {
    pub fn from_env() -> Option<Self> {
        let email = env_optional("ADMIN_EMAIL")?;
        let password = env_optional("ADMIN_PASSWORD")?;
        Some(Self {
            name: env_or_default("ADMIN_NAME", "Admin"),
            email,
            password,
        })
    }
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    /// `None` runs the API on in-memory stores
    pub database: Option<PostgresConfig>,
    pub jwt: JwtConfig,
    pub notifications: NotificationConfig,
    pub uploads: UploadConfig,
    pub admin: Option<AdminAccount>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env_optional()?,
            jwt: JwtConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            admin: AdminAccount::from_env(),
        })
    }
}
