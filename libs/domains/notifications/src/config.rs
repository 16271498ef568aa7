use core_config::{ConfigError, FromEnv, env_or_default, env_optional, env_parse};
use std::time::Duration;

/// Seconds a single delivery may take before it is abandoned
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_email: String,
    pub from_name: String,
    /// Optional for dev servers like Mailpit.
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS relay when true, plaintext otherwise.
    pub use_tls: bool,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, port: u16, from_email: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            from_email: from_email.into(),
            from_name: "Marketplace".to_string(),
            username: None,
            password: None,
            use_tls: false,
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// `None` when `SMTP_HOST` is unset.
    ///
    /// - `SMTP_PORT` (default: 1025)
    /// - `SMTP_FROM_EMAIL` (default: noreply@localhost)
    /// - `SMTP_FROM_NAME` (default: Marketplace)
    /// - `SMTP_USERNAME`, `SMTP_PASSWORD`
    /// - `SMTP_USE_TLS` (default: false)
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        let Some(host) = env_optional("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: env_parse("SMTP_PORT", 1025u16)?,
            from_email: env_or_default("SMTP_FROM_EMAIL", "noreply@localhost"),
            from_name: env_or_default("SMTP_FROM_NAME", "Marketplace"),
            username: env_optional("SMTP_USERNAME"),
            password: env_optional("SMTP_PASSWORD"),
            use_tls: env_parse("SMTP_USE_TLS", false)?,
        }))
    }
}

/// Gateway selection and delivery bound
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub smtp: Option<SmtpConfig>,
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            smtp: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FromEnv for NotificationConfig {
    /// SMTP settings plus `NOTIFICATION_TIMEOUT_SECS` (default: 10)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp: SmtpConfig::from_env_optional()?,
            timeout: Duration::from_secs(env_parse(
                "NOTIFICATION_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}
