//! Application state management

use axum_helpers::JwtAuth;
use domain_notifications::NotificationDispatcher;
use domain_products::{ImageStore, LocalImageStore};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when running on in-memory stores
    pub db: Option<DatabaseConnection>,
    pub auth: JwtAuth,
    pub notifications: NotificationDispatcher,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Option<DatabaseConnection>,
        notifications: NotificationDispatcher,
    ) -> Self {
        let auth = JwtAuth::new(&config.jwt);
        let images = Arc::new(LocalImageStore::new(&config.uploads.dir));

        Self {
            config,
            db,
            auth,
            notifications,
            images,
        }
    }
}
