//! S3 (and S3-compatible) object storage

use crate::{object_key, ObjectStorage, StorageConfig, StorageError, StorageResult};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::instrument;

pub struct S3Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url(),
        }
    }

    /// Build a client from the AWS default credential chain.
    ///
    /// A custom endpoint switches to path-style addressing, which MinIO and
    /// LocalStack require.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "S3 storage configured"
        );

        Self::new(Client::from_conf(builder.build()), config)
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_for<'a>(&self, url: &'a str) -> StorageResult<&'a str> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StorageError::UnknownUrl(url.to_string()))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        let key = object_key(folder, file_name, chrono::Utc::now().timestamp_millis());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(key = %key, "Object uploaded");
        Ok(self.url_for(&key))
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> StorageResult<()> {
        let key = self.key_for(url)?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(key, "Object deleted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> S3Storage {
        let config = StorageConfig {
            region: "eu-west-1".into(),
            bucket: "tornado-assets".into(),
            endpoint_url: None,
            public_url: Some("https://cdn.tornado.test".into()),
        };
        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::new()
                .region(aws_sdk_s3::config::Region::new("eu-west-1"))
                .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                .build(),
        );
        S3Storage::new(client, &config)
    }

    #[test]
    fn test_key_round_trip() {
        let storage = storage();
        let url = storage.url_for("products/1-a.png");
        assert_eq!(url, "https://cdn.tornado.test/products/1-a.png");
        assert_eq!(storage.key_for(&url).unwrap(), "products/1-a.png");
    }

    #[test]
    fn test_foreign_url_rejected() {
        let storage = storage();
        assert!(matches!(
            storage.key_for("https://other.example/products/1-a.png"),
            Err(StorageError::UnknownUrl(_))
        ));
        assert!(storage.key_for("https://cdn.tornado.test/").is_err());
    }
}
