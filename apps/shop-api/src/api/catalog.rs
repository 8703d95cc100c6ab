//! Category and brand routes

use std::sync::Arc;

use axum::Router;
use domain_catalog::{
    BrandService, CategoryService, MongoBrandRepository, MongoCategoryRepository, handlers,
};
use domain_products::MongoProductRepository;
use mongodb::Database;

use crate::adapters::ProductLookup;
use crate::state::AppState;

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoCategoryRepository::new(db).init_indexes().await?;
    MongoBrandRepository::new(db).init_indexes().await?;
    Ok(())
}

/// Create the `/categories` and `/brands` routers
pub fn router(state: &AppState) -> Router {
    let categories = CategoryService::new(
        MongoCategoryRepository::new(&state.db),
        state.storage.clone(),
    );

    let usage = Arc::new(ProductLookup::new(MongoProductRepository::new(&state.db)));
    let brands = BrandService::new(
        MongoBrandRepository::new(&state.db),
        usage,
        state.storage.clone(),
    );

    Router::new()
        .nest("/categories", handlers::categories_router(categories))
        .nest("/brands", handlers::brands_router(brands))
}
