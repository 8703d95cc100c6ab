//! Catalog Domain
//!
//! Categories (a two-level tree) and watch brands, both with uploaded
//! artwork and admin-only writes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │           Handlers           │  ← /categories, /brands
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │ CategoryService BrandService │  ← Name uniqueness, delete guards ──► ObjectStorage
//! └──────┬─────────────────┬─────┘
//!        │                 │
//! ┌──────▼──────┐   ┌──────▼──────┐
//! │ Repository  │   │ BrandUsage  │  ← implemented by the products domain
//! └──────┬──────┘   └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Category, CategoryNode, Brand
//! └─────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    build_tree, Brand, Category, CategoryNode, CreateBrand, CreateCategory, UpdateBrand,
    UpdateCategory,
};
pub use mongodb::{MongoBrandRepository, MongoCategoryRepository};
pub use repository::{
    BrandRepository, BrandUsage, CategoryRepository, InMemoryBrandRepository,
    InMemoryBrandUsage, InMemoryCategoryRepository,
};
pub use service::{BrandService, CategoryService};
