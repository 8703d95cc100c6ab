//! Object storage for uploaded images and documents.
//!
//! Resources keep only the public URL returned by [`ObjectStorage::upload`]; the same
//! URL is handed back to [`ObjectStorage::delete`] when the asset is replaced or its
//! owner removed.
//!
//! Keys have the shape `{folder}/{unix_millis}-{sanitized_file_name}`.

mod config;
mod error;
mod memory;
mod s3;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryStorage, StoredObject};
pub use s3::S3Storage;

use async_trait::async_trait;
use std::sync::Arc;

/// Folders used by the shop.
pub mod folders {
    pub const PRODUCTS: &str = "products";
    pub const PROFILES: &str = "profiles";
    pub const CATEGORIES: &str = "categories";
    pub const BRANDS: &str = "brands";
    pub const BLOGS: &str = "blogs";
    pub const TESTIMONIALS: &str = "testimonials";
    pub const WARRANTY_DOCUMENTS: &str = "warranty-documents";
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String>;

    /// Remove the object behind a URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> StorageResult<()>;

    fn name(&self) -> &'static str;
}

/// Shared handle held by domain services.
pub type SharedStorage = Arc<dyn ObjectStorage>;

/// Delete every URL, logging failures instead of returning them.
///
/// Used when an asset is replaced or its owner deleted: the primary write has
/// already happened and an orphaned object must not fail the request.
pub async fn delete_quietly<I, S>(storage: &dyn ObjectStorage, urls: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for url in urls {
        let url = url.as_ref();
        if let Err(e) = storage.delete(url).await {
            tracing::warn!(url, error = %e, backend = storage.name(), "Failed to delete stored object");
        }
    }
}

/// Build the object key for an upload.
pub fn object_key(folder: &str, file_name: &str, unix_millis: i64) -> String {
    format!(
        "{}/{}-{}",
        folder.trim_matches('/'),
        unix_millis,
        sanitize_file_name(file_name)
    )
}

/// Lowercase, with anything outside `[a-z0-9._-]` replaced by `-`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);

    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_shape() {
        assert_eq!(
            object_key("products", "Diver 300.JPG", 1_700_000_000_000),
            "products/1700000000000-diver-300.jpg"
        );
    }

    #[test]
    fn test_sanitize_strips_paths_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my watch (1).png"), "my-watch--1-.png");
        assert_eq!(sanitize_file_name("   "), "file");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[tokio::test]
    async fn test_delete_quietly_swallows_failures() {
        let storage = InMemoryStorage::new();
        let url = storage
            .upload("brands", "logo.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        delete_quietly(&storage, [url.as_str(), "https://elsewhere.example/x.png"]).await;

        assert!(storage.is_empty().await);
        assert_eq!(storage.deleted().await, vec![url]);
    }
}
