use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    /// The URL was not produced by this storage backend
    #[error("Unknown object URL: {0}")]
    UnknownUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<core_config::ConfigError> for StorageError {
    fn from(err: core_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
