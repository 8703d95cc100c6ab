//! Contact form, newsletter and warranty routes

use std::sync::Arc;

use axum::Router;
use domain_products::MongoProductRepository;
use domain_support::{
    ContactService, MongoContactRepository, MongoSubscriberRepository, MongoWarrantyRepository,
    NewsletterService, WarrantyService, handlers,
};
use mongodb::Database;

use crate::adapters::ProductLookup;
use crate::state::AppState;

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoContactRepository::new(db).init_indexes().await?;
    MongoSubscriberRepository::new(db).init_indexes().await?;
    MongoWarrantyRepository::new(db).init_indexes().await?;
    Ok(())
}

pub fn router(state: &AppState) -> Router {
    let shop = &state.config.shop;

    let contacts = ContactService::new(
        MongoContactRepository::new(&state.db),
        state.mailer.clone(),
        shop.admin_email.clone(),
    );
    let newsletter = NewsletterService::new(
        MongoSubscriberRepository::new(&state.db),
        state.mailer.clone(),
        shop.client_url.clone(),
    );
    let warranties = WarrantyService::new(
        MongoWarrantyRepository::new(&state.db),
        Arc::new(ProductLookup::new(MongoProductRepository::new(&state.db))),
        state.storage.clone(),
    );

    Router::new()
        .nest("/contact", handlers::contact_router(contacts))
        .nest("/newsletter", handlers::newsletter_router(newsletter))
        .nest("/warranty", handlers::warranty_router(warranties))
}
