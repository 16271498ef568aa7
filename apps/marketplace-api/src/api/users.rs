//! Users API routes

use axum::Router;
use domain_users::{handlers, UserRepository, UserService};

use crate::state::AppState;

pub fn router<U: UserRepository + 'static>(state: &AppState, service: UserService<U>) -> Router {
    handlers::router(service, state.auth.clone())
}
