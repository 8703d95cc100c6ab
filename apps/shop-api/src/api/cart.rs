//! Cart, checkout and abandoned cart recovery routes
//!
//! The cart reads products and customers through the adapters, never through
//! the products or users services.

use std::sync::Arc;

use axum::Router;
use domain_cart::{AbandonmentService, CartService, MongoCartRepository, handlers};
use domain_products::MongoProductRepository;
use domain_users::MongoUserRepository;
use mongodb::Database;

use crate::adapters::{CustomerLookup, ProductLookup};
use crate::state::AppState;

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoCartRepository::new(db).init_indexes().await?;
    Ok(())
}

/// Create the `/cart` and `/admin/carts` routers
pub fn router(state: &AppState) -> Router {
    let products = Arc::new(ProductLookup::new(MongoProductRepository::new(&state.db)));
    let customers = Arc::new(CustomerLookup::new(MongoUserRepository::new(&state.db)));

    let carts = CartService::new(MongoCartRepository::new(&state.db), products);
    let abandonment = AbandonmentService::new(
        MongoCartRepository::new(&state.db),
        customers,
        state.mailer.clone(),
        state.config.shop.client_url.clone(),
    )
    .with_default_hours(state.config.shop.abandoned_cart_hours);

    Router::new()
        .nest("/cart", handlers::router(carts))
        .nest("/admin/carts", handlers::admin_router(abandonment))
}
