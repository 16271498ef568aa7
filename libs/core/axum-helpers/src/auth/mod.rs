//! Stateless JWT authentication.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/products", post(create_product))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{DEFAULT_ACCESS_TOKEN_TTL, IssuedToken, JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
