//! Cart Domain
//!
//! Shopping cart, checkout pricing and the abandoned-cart sweep.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │        Handlers         │  ← /cart (shopper), /admin/carts (admin)
//! └────────────┬────────────┘
//!              │
//! ┌────────────▼────────────┐
//! │ CartService             │  ← Stock checks, checkout pricing
//! │ AbandonmentService      │  ← Sweep, stats, recovery emails
//! └──────┬───────────┬──────┘
//!        │           │
//! ┌──────▼──────┐ ┌──▼────────────────┐
//! │ Repository  │ │ ProductCatalog    │  ← implemented by the products
//! │             │ │ CustomerDirectory │    and users domains
//! └──────┬──────┘ └───────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Cart keeps `total_price` equal to the sum of its lines
//! └─────────────┘
//! ```
//!
//! Every write is a compare-and-swap on `Cart::version`, so two concurrent
//! mutations of the same cart cannot silently overwrite each other; the loser
//! gets a 409.
//!
//! # Usage
//!
//! The cart never reads the products collection itself. The binary supplies a
//! [`ProductCatalog`] that adapts the products domain's repository, mapping each
//! product to a [`ProductSnapshot`]:
//!
//! ```rust,no_run
//! use domain_cart::{handlers, CartService, MongoCartRepository, ProductCatalog};
//! use std::sync::Arc;
//!
//! # async fn example(db: mongodb::Database, products: Arc<dyn ProductCatalog>) {
//! let repository = MongoCartRepository::new(&db);
//! let service = CartService::new(repository, products);
//! let router = handlers::router(service);
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pricing;
pub mod repository;
pub mod service;

pub use error::{CartError, CartResult};
pub use handlers::ApiDoc;
pub use models::{
    AbandonedCart, AbandonedCartStats, AbandonedTotals, AddToCart, Cart, CartLineItem,
    CheckoutDraft, CheckoutRequest, CheckoutResponse, Customer, MarkAbandonedRequest,
    MarkAbandonedResponse, OrderItem, ProductSnapshot, RecoveryResponse, ShippingAddress,
    UpdateCartItem,
};
pub use mongodb::MongoCartRepository;
pub use pricing::PriceBreakdown;
pub use repository::{
    CartRepository, CustomerDirectory, InMemoryCartRepository, InMemoryCustomerDirectory,
    InMemoryProductCatalog, ProductCatalog,
};
pub use service::{
    AbandonmentService, CartService, DEFAULT_ABANDONED_HOURS, MAX_ABANDONED_HOURS,
};
