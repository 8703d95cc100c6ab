//! MongoDB connector, health probe and BSON helpers

mod config;
mod filters;
mod connector;
mod health;
mod paging;
pub mod serde_helpers;

pub use filters::{DUPLICATE_KEY_CODE, contains_ci, is_duplicate_key, uuid_bson, uuid_in};
pub use config::MongoConfig;
pub use connector::{MongoError, connect_from_config, connect_from_config_with_retry};
pub use health::check_health;
pub use paging::find_page;

pub use mongodb::{Client, Collection, Database};
