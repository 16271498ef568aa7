use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Parse the comma-separated `CORS_ALLOWED_ORIGIN` list
fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }
    Ok(origins)
}

fn cors_layer() -> io::Result<CorsLayer> {
    let raw = std::env::var("CORS_ALLOWED_ORIGIN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN environment variable is required. Example: CORS_ALLOWED_ORIGIN=http://localhost:3000",
        )
    })?;
    let origins = parse_origins(&raw)?;
    info!("CORS configured with allowed origins: {}", raw);

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

/// Wrap domain routes with documentation UIs and cross-cutting layers.
///
/// - `apis` is nested under `/api` (state already applied)
/// - Swagger UI, ReDoc, RapiDoc and Scalar render `T::openapi()`
/// - Unknown paths fall back to a JSON 404
/// - `CORS_ALLOWED_ORIGIN` is required
///
/// Routes that must live outside `/api` (health, static files) are merged by
/// the caller afterwards.
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors = cors_layer()?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by
/// `shutdown_timeout`.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();
    let signal_watcher = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    tokio::spawn(async move { signal_watcher.wait_for_signal().await });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
