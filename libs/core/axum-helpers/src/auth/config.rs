use core_config::{ConfigError, FromEnv, env_parse, env_required};

use super::jwt::DEFAULT_ACCESS_TOKEN_TTL;

const MIN_SECRET_LEN: usize = 32;

/// JWT signing settings.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_TTL_SECONDS` (default: 3600)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        validate_secret(&secret)?;
        Ok(Self {
            secret,
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
        })
    }

    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.access_token_ttl = seconds;
        self
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self::new(env_required("JWT_SECRET")?)?;
        let ttl = env_parse("JWT_TTL_SECONDS", config.access_token_ttl)?;
        Ok(config.with_ttl(ttl))
    }
}
