//! # Axum Helpers
//!
//! Shared HTTP plumbing for the marketplace services.
//!
//! - **[`auth`]**: stateless JWT issuing, verification and middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`errors`]**: [`AppError`] and the structured [`ErrorResponse`] body
//! - **[`extractors`]**: validated JSON bodies and integer path ids
//!
//! ```ignore
//! let api_routes = Router::new().nest("/users", domain_users::handlers::router(service, auth));
//! let router = axum_helpers::create_router::<ApiDoc>(api_routes)?
//!     .merge(health_router(app_info!()));
//! create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod server;

pub use auth::{IssuedToken, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};
pub use errors::{AppError, AppResult, ErrorCode, ErrorResponse};
pub use extractors::{IdPath, ValidatedJson};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
