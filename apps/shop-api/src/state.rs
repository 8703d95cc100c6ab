//! Shared application state.
//!
//! Built once in `main` and borrowed by every route module to construct its
//! repositories and services.

use axum_helpers::JwtAuth;
use email::Mailer;
use mongodb::{Client, Database};
use storage::SharedStorage;

/// Everything the route modules need to wire a domain.
///
/// Cloning is cheap: the Mongo client, storage, mailer and JWT keys are all
/// reference counted internally.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
    /// Object storage for uploaded images and documents
    pub storage: SharedStorage,
    pub mailer: Mailer,
    pub jwt: JwtAuth,
}
