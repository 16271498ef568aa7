//! Marketplace API - classified-ad listings over REST

use axum::Router;
use axum_helpers::server::{create_production_app, health_router};
use core_config::load_dotenv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_notifications::{gateway_from_config, NotificationDispatcher};
use domain_products::uploads::PUBLIC_PREFIX;
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    load_dotenv();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(postgres) => {
            info!("Connecting to PostgreSQL");
            let db = database::postgres::connect_from_config_with_retry(postgres, None).await?;
            database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
            Some(db)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
            None
        }
    };

    let gateway = gateway_from_config(&config.notifications)?;
    info!(gateway = gateway.name(), "Notification gateway ready");
    let notifications = NotificationDispatcher::new(gateway, config.notifications.timeout);

    tokio::fs::create_dir_all(&config.uploads.dir).await?;

    let state = AppState::new(config, db, notifications);
    let app = build_app(&state).await?;

    info!(
        "Starting Marketplace API on port {}",
        state.config.server.port
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        if let Some(db) = state.db {
            info!("Shutting down: closing PostgreSQL connections");
            if let Err(e) = db.close().await {
                warn!("Failed to close PostgreSQL pool: {}", e);
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Marketplace API shutdown complete");
    Ok(())
}

async fn build_app(state: &AppState) -> eyre::Result<Router> {
    let api_routes = api::routes(state).await?;
    assemble(state, api_routes)
}

/// `/api` routes wrapped by the shared router, plus `/health`, `/ready` and images
fn assemble(state: &AppState, api_routes: Router) -> eyre::Result<Router> {
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&state.config.uploads.dir)))
}
