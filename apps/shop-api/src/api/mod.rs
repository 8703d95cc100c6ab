//! API routes module
//!
//! Wires every domain's MongoDB repositories into its services and mounts the
//! resulting routers. Everything here is nested under `/api` by
//! `axum_helpers::create_router`.

pub mod cart;
pub mod catalog;
pub mod content;
pub mod health;
pub mod products;
pub mod support;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .nest("/users", users::router(state))
        .merge(cart::router(state))
        .merge(catalog::router(state))
        .merge(content::router(state))
        .merge(support::router(state))
        .merge(health::router(state.clone()))
}

/// Create every collection's indexes before serving traffic
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(&state.db).await?;
    users::init_indexes(&state.db).await?;
    cart::init_indexes(&state.db).await?;
    catalog::init_indexes(&state.db).await?;
    content::init_indexes(&state.db).await?;
    support::init_indexes(&state.db).await?;
    Ok(())
}
