use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// A boxed readiness probe
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Run probes concurrently. Any failure yields 503 with per-probe status.
///
/// ```ignore
/// run_health_checks(vec![
///     ("database", Box::pin(async { check_health(&db).await.map_err(|e| e.to_string()) })),
/// ])
/// .await
/// ```
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> (StatusCode, Json<Value>) {
    let (names, probes): (Vec<_>, Vec<_>) = checks.into_iter().unzip();
    let results = join_all(probes).await;

    let mut body = Map::new();
    let mut all_healthy = true;

    for (name, result) in names.into_iter().zip(results) {
        let status = match result {
            Ok(()) => "connected",
            Err(e) => {
                tracing::error!("Readiness check failed: {} error: {}", name, e);
                all_healthy = false;
                "disconnected"
            }
        };
        body.insert(name.to_string(), json!(status));
    }

    let (status, label) = if all_healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    };
    body.insert("status".to_string(), json!(label));

    (status, Json(Value::Object(body)))
}

async fn health_handler(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    })
}

/// Liveness endpoint at `/health`
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}
