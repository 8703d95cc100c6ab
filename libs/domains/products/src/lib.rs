//! Products Domain
//!
//! The watch catalogue: listing with filters and sorting, curated shelves, quick
//! search, admin CRUD, image uploads and customer reviews.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart uploads
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Visibility, search fallback, reviews ──► ObjectStorage
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, WatchDetails, Review, filters
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, MongoProductRepository, ProductService};
//! use std::sync::Arc;
//! use storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("shop");
//!
//! let repository = MongoProductRepository::new(&db);
//! let service = ProductService::new(repository, Arc::new(InMemoryStorage::new()));
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
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, CreateReview, Gender, Highlight, Movement, Product, ProductFilter,
    ProductQuery, Review, ReviewAdded, SearchParams, SearchStage, SortField, SortKey,
    UpdateProduct, WatchDetails, WatchStyle, DEFAULT_WARRANTY_MONTHS, MAX_PRICE,
};
pub use mongodb::MongoProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
