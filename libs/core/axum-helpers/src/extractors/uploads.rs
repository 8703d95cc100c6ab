//! Multipart upload collection.

use crate::errors::AppError;
use axum::{body::Bytes, extract::Multipart};

/// Largest accepted single file.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for product/category/brand/profile imagery.
pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Content types accepted for warranty paperwork.
pub const DOCUMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
];

/// One file read from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// What a given upload endpoint accepts.
#[derive(Debug, Clone, Copy)]
pub struct UploadRules {
    /// Form field carrying the files
    pub field: &'static str,
    pub max_files: usize,
    pub allowed_types: &'static [&'static str],
}

impl UploadRules {
    pub const fn images(field: &'static str, max_files: usize) -> Self {
        Self {
            field,
            max_files,
            allowed_types: IMAGE_TYPES,
        }
    }

    pub const fn documents(field: &'static str, max_files: usize) -> Self {
        Self {
            field,
            max_files,
            allowed_types: DOCUMENT_TYPES,
        }
    }

    /// Check a file against the type and size limits.
    pub fn check(&self, file: &UploadedFile) -> Result<(), AppError> {
        if !self.allowed_types.contains(&file.content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type {} for {}",
                file.content_type, file.file_name
            )));
        }
        if file.bytes.len() > MAX_FILE_BYTES {
            return Err(AppError::BadRequest(format!(
                "File {} exceeds the {} MB limit",
                file.file_name,
                MAX_FILE_BYTES / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

/// Read every file sent under `rules.field`, ignoring other fields.
///
/// Rejects with 400 when no file was sent, when more than `max_files` were sent,
/// or when a file breaks the type or size limits.
pub async fn collect_files(
    mut multipart: Multipart,
    rules: UploadRules,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(rules.field) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        let file = UploadedFile {
            file_name,
            content_type,
            bytes,
        };
        rules.check(&file)?;
        files.push(file);

        if files.len() > rules.max_files {
            return Err(AppError::BadRequest(format!(
                "You can upload at most {} files",
                rules.max_files
            )));
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Please upload a file in the '{}' field",
            rules.field
        )));
    }

    Ok(files)
}

/// Like [`collect_files`] for endpoints that take exactly one file.
pub async fn collect_single_file(
    multipart: Multipart,
    field: &'static str,
) -> Result<UploadedFile, AppError> {
    let mut files = collect_files(multipart, UploadRules::images(field, 1)).await?;
    files
        .pop()
        .ok_or_else(|| AppError::BadRequest(format!("Please upload a file in the '{}' field", field)))
}
