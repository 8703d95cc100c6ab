//! MongoDB connectivity for the shop backend.
//!
//! Connection setup with retry, health probes, and the small set of BSON helpers
//! every domain repository shares (UUID filters, timestamp encoding, paging).
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector and helpers
//! - `config` - `MongoConfig` loading via `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "tornado");
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::RetryConfig;
