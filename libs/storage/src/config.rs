use core_config::{env_optional, env_required, ConfigError, FromEnv};

/// Bucket location and the base URL objects are served from.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    /// S3-compatible endpoint (MinIO, R2, LocalStack); `None` for AWS
    pub endpoint_url: Option<String>,
    /// Overrides the derived public base URL (CDN in front of the bucket)
    pub public_url: Option<String>,
}

impl StorageConfig {
    /// Base URL that object keys are appended to, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        let base = match (&self.public_url, &self.endpoint_url) {
            (Some(public), _) => public.clone(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        };
        base.trim_end_matches('/').to_string()
    }
}

impl FromEnv for StorageConfig {
    /// `AWS_REGION` and `AWS_BUCKET_NAME` are required; `AWS_ENDPOINT_URL` and
    /// `STORAGE_PUBLIC_URL` are optional. Credentials come from the AWS default chain.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            region: env_required("AWS_REGION")?,
            bucket: env_required("AWS_BUCKET_NAME")?,
            endpoint_url: env_optional("AWS_ENDPOINT_URL"),
            public_url: env_optional("STORAGE_PUBLIC_URL"),
        })
    }
}
