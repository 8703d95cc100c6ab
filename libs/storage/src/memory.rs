use crate::{object_key, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const BASE_URL: &str = "memory://uploads";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Storage that keeps objects in a map, for tests and local runs without S3.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    deleted: Arc<RwLock<Vec<String>>>,
    /// Monotonic stand-in for the upload timestamp so keys never collide
    clock: Arc<AtomicI64>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, url: &str) -> Option<StoredObject> {
        let key = url.strip_prefix(BASE_URL)?.strip_prefix('/')?;
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// URLs passed to successful deletes, in order.
    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        let key = object_key(folder, file_name, tick);

        self.objects.write().await.insert(
            key.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        Ok(format!("{BASE_URL}/{key}"))
    }

    async fn delete(&self, url: &str) -> StorageResult<()> {
        let key = url
            .strip_prefix(BASE_URL)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::UnknownUrl(url.to_string()))?;

        if self.objects.write().await.remove(key).is_none() {
            return Err(StorageError::Delete(format!("No object at {key}")));
        }
        self.deleted.write().await.push(url.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_get() {
        let storage = InMemoryStorage::new();
        let url = storage
            .upload("profiles", "Me.PNG", "image/png", vec![9, 9])
            .await
            .unwrap();

        assert!(url.starts_with("memory://uploads/profiles/"));
        assert!(url.ends_with("-me.png"));
        let object = storage.get(&url).await.unwrap();
        assert_eq!(object.content_type, "image/png");
        assert_eq!(object.bytes, vec![9, 9]);
    }

    #[tokio::test]
    async fn test_same_name_twice_gets_distinct_keys() {
        let storage = InMemoryStorage::new();
        let a = storage.upload("blogs", "cover.jpg", "image/jpeg", vec![]).await.unwrap();
        let b = storage.upload("blogs", "cover.jpg", "image/jpeg", vec![]).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_object_fails() {
        let storage = InMemoryStorage::new();
        let err = storage.delete("memory://uploads/x/1-y.png").await.unwrap_err();
        assert!(matches!(err, StorageError::Delete(_)));
        assert!(storage.deleted().await.is_empty());
    }
}
