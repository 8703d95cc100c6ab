use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Blog post not found")]
    BlogNotFound,

    #[error("Testimonial not found")]
    TestimonialNotFound,

    #[error("FAQ not found")]
    FaqNotFound,

    #[error("Cannot comment on unpublished blog post")]
    CommentOnUnpublished,

    #[error("Name and email are required to comment")]
    MissingCommenter,

    #[error("Invalid FAQ category: {0}")]
    InvalidCategory(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::BlogNotFound
            | ContentError::TestimonialNotFound
            | ContentError::FaqNotFound => AppError::NotFound(err.to_string()),
            ContentError::CommentOnUnpublished
            | ContentError::MissingCommenter
            | ContentError::InvalidCategory(_) => AppError::BadRequest(err.to_string()),
            ContentError::Validation(msg) => AppError::BadRequest(msg),
            ContentError::Storage(e) => AppError::InternalServerError(e.to_string()),
            ContentError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ContentError {
    fn from(err: mongodb::error::Error) -> Self {
        ContentError::Database(err.to_string())
    }
}
