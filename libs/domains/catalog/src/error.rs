use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Brand not found")]
    BrandNotFound,

    #[error("Category already exists")]
    DuplicateCategory,

    #[error("Brand already exists")]
    DuplicateBrand,

    #[error("Parent category not found")]
    ParentNotFound,

    #[error("Category cannot be its own parent")]
    SelfParent,

    #[error("Cannot delete category with subcategories. Please delete or reassign subcategories first.")]
    HasSubcategories,

    #[error("Cannot delete brand with associated products")]
    BrandInUse,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CategoryNotFound | CatalogError::BrandNotFound => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::DuplicateCategory
            | CatalogError::DuplicateBrand
            | CatalogError::ParentNotFound
            | CatalogError::SelfParent
            | CatalogError::HasSubcategories
            | CatalogError::BrandInUse => AppError::BadRequest(err.to_string()),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Storage(e) => AppError::InternalServerError(e.to_string()),
            CatalogError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}
