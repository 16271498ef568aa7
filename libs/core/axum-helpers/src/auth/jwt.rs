use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One hour
pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 3600;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // User ID
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    /// Numeric user id carried in `sub`
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// HS256 signer and verifier. Cheap to clone.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        tracing::info!(ttl_seconds = config.access_token_ttl, "JWT auth initialized");

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            ttl: config.access_token_ttl,
        }
    }

    pub fn issue_access_token(
        &self,
        user_id: i32,
        email: &str,
        name: &str,
        is_admin: bool,
    ) -> eyre::Result<IssuedToken> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            is_admin,
            exp: (now + Duration::seconds(self.ttl)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl,
        })
    }

    /// Verify signature and expiry, then decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let data = decode::<JwtClaims>(
            token,
            &self.keys.decoding,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("marketplace-test-secret-0123456789abcdef").unwrap())
    }

    #[test]
    fn test_issue_and_verify() {
        let auth = auth();
        let issued = auth
            .issue_access_token(7, "ana@example.com", "Ana", true)
            .unwrap();
        assert_eq!(issued.expires_in, DEFAULT_ACCESS_TOKEN_TTL);

        let claims = auth.verify_token(&issued.token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-xx").unwrap());
        let issued = other.issue_access_token(1, "a@b.c", "A", false).unwrap();
        assert!(auth().verify_token(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig::new("marketplace-test-secret-0123456789abcdef")
            .unwrap()
            .with_ttl(-3600);
        let auth = JwtAuth::new(&config);
        let issued = auth.issue_access_token(1, "a@b.c", "A", false).unwrap();
        assert!(auth.verify_token(&issued.token).is_err());
    }
}
