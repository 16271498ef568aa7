//! API routes module

pub mod health;
pub mod products;
pub mod users;

use axum::Router;
use domain_products::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use domain_users::{InMemoryUserRepository, PgUserRepository, UserRepository, UserService};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Create all API routes, backed by Postgres when a connection is configured
pub async fn routes(state: &AppState) -> eyre::Result<Router> {
    match &state.db {
        Some(db) => {
            mount(
                state,
                PgUserRepository::new(db.clone()),
                PgProductRepository::new(db.clone()),
            )
            .await
        }
        None => {
            let users = InMemoryUserRepository::new();
            let products = InMemoryProductRepository::new(users.clone());
            mount(state, users, products).await
        }
    }
}

async fn mount<U, P>(state: &AppState, users: U, products: P) -> eyre::Result<Router>
where
    U: UserRepository + 'static,
    P: ProductRepository + 'static,
{
    let user_store = Arc::new(users);
    let user_service = UserService::from_shared(user_store.clone());

    if let Some(admin) = &state.config.admin {
        let account = user_service
            .ensure_admin(&admin.name, &admin.email, &admin.password)
            .await?;
        info!(user_id = account.user_id, "Admin account available");
    }

    Ok(Router::new()
        .nest("/products", products::router(state, products, user_store))
        .nest("/users", users::router(state, user_service)))
}
