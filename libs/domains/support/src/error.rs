use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use email::EmailError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupportError {
    #[error("Contact message not found")]
    ContactNotFound,

    #[error("Subscriber not found")]
    SubscriberNotFound,

    #[error("Email is already on the newsletter list")]
    DuplicateSubscriber,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("No active subscribers found")]
    NoActiveSubscribers,

    #[error("Warranty not found")]
    WarrantyNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Warranty already registered for this serial number")]
    DuplicateSerial,

    #[error("A warranty can hold at most {0} documents")]
    TooManyDocuments(usize),

    #[error("Not authorized to access this warranty")]
    NotOwner,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type SupportResult<T> = Result<T, SupportError>;

impl From<SupportError> for AppError {
    fn from(err: SupportError) -> Self {
        match err {
            SupportError::ContactNotFound
            | SupportError::SubscriberNotFound
            | SupportError::WarrantyNotFound
            | SupportError::ProductNotFound => AppError::NotFound(err.to_string()),
            SupportError::InvalidToken
            | SupportError::NoActiveSubscribers
            | SupportError::DuplicateSerial
            | SupportError::TooManyDocuments(_) => AppError::BadRequest(err.to_string()),
            SupportError::DuplicateSubscriber => AppError::Conflict(err.to_string()),
            SupportError::NotOwner => AppError::Forbidden(err.to_string()),
            SupportError::Validation(msg) => AppError::BadRequest(msg),
            SupportError::Email(e) => AppError::InternalServerError(e.to_string()),
            SupportError::Storage(e) => AppError::InternalServerError(e.to_string()),
            SupportError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for SupportError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for SupportError {
    fn from(err: mongodb::error::Error) -> Self {
        SupportError::Database(err.to_string())
    }
}
