//! Readiness endpoint

use axum::{extract::State, routing::get, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use database::postgres::check_health;
use sea_orm::DatabaseConnection;

use crate::state::AppState;

async fn ready(State(db): State<Option<DatabaseConnection>>) -> impl axum::response::IntoResponse {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = Vec::new();
    if let Some(db) = db.as_ref() {
        checks.push((
            "database",
            Box::pin(async move { check_health(db).await.map_err(|e| e.to_string()) }),
        ));
    }

    run_health_checks(checks).await
}

/// `/ready`; in-memory deployments have nothing to probe and always report ready
pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state.db.clone())
}
