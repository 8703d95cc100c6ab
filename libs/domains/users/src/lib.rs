//! Users Domain
//!
//! Customer accounts: registration and login with Argon2 password hashes and
//! cookie-borne JWT sessions, profiles with an uploaded picture, saved
//! addresses, wishlists, and admin user management.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, session cookies
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Password hashing, token issuing ──► ObjectStorage
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, Address, request/response DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//! use std::sync::Arc;
//! use storage::InMemoryStorage;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-32-characters!", 30)?);
//! let service = UserService::new(
//!     InMemoryUserRepository::new(),
//!     Arc::new(InMemoryStorage::new()),
//!     jwt,
//! );
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    Address, AddressInput, AdminUpdateUser, AuthResponse, LoginRequest, RegisterRequest,
    SessionUser, UpdateAddress, UpdateProfile, User, UserFilter, UserQuery, UserResponse,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
