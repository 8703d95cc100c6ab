//! Custom extractors for Axum handlers.

pub mod uploads;
pub mod uuid_path;
pub mod validated_json;

pub use uploads::{UploadRules, UploadedFile, collect_files, collect_single_file};
pub use uuid_path::{UuidPath, UuidPathPair};
pub use validated_json::ValidatedJson;
