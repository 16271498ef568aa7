//! Products API routes

use axum::Router;
use domain_products::{handlers, ProductRepository, ProductService};
use domain_users::UserRepository;
use std::sync::Arc;

use crate::state::AppState;

/// Create products router
pub fn router<P, U>(state: &AppState, repository: P, users: Arc<U>) -> Router
where
    P: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    let service = ProductService::new(repository, users, state.notifications.clone());
    handlers::router(
        service,
        state.images.clone(),
        state.auth.clone(),
        state.config.uploads.max_bytes,
    )
}
