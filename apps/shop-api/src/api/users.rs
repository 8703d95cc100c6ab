//! Users and authentication API routes

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};
use mongodb::Database;

use crate::state::AppState;

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db).init_indexes().await?;
    Ok(())
}

/// Create users router, mounted at `/users`
pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(&state.db);
    let service = UserService::new(repository, state.storage.clone(), state.jwt.clone())
        .with_secure_cookies(state.config.secure_cookies());

    handlers::router(service)
}
