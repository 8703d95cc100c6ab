use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    /// Cart, line item, product or owner is missing; carries the client message
    #[error("{0}")]
    NotFound(String),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Product is out of stock or has insufficient quantity")]
    OutOfStock,

    #[error("Cannot add more than {max} units of this product")]
    InsufficientStock { max: i32 },

    #[error("Cart total cannot exceed {max} cents")]
    TotalTooLarge { max: i64 },

    #[error("Insufficient stock for {0}")]
    InsufficientStockFor(String),

    #[error("Shipping address and payment method are required")]
    MissingField,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product {0} no longer exists")]
    ProductGone(String),

    #[error("This cart is not marked as abandoned")]
    NotAbandoned,

    #[error("Cart was modified concurrently, please retry")]
    Conflict,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CartResult<T> = Result<T, CartError>;

impl CartError {
    pub fn cart_not_found() -> Self {
        CartError::NotFound("Cart not found".to_string())
    }

    pub fn item_not_found() -> Self {
        CartError::NotFound("Item not found in cart".to_string())
    }

    pub fn product_not_found() -> Self {
        CartError::NotFound("Product not found".to_string())
    }

    pub fn user_not_found() -> Self {
        CartError::NotFound("User not found".to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound(msg) => AppError::NotFound(msg),
            CartError::Conflict => AppError::Conflict(err.to_string()),
            CartError::Validation(msg) => AppError::BadRequest(msg),
            CartError::Database(msg) => AppError::Database(msg),
            CartError::InvalidQuantity
            | CartError::OutOfStock
            | CartError::InsufficientStock { .. }
            | CartError::TotalTooLarge { .. }
            | CartError::InsufficientStockFor(_)
            | CartError::MissingField
            | CartError::EmptyCart
            | CartError::ProductGone(_)
            | CartError::NotAbandoned => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CartError {
    fn from(err: mongodb::error::Error) -> Self {
        CartError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_messages() {
        assert_eq!(
            CartError::InsufficientStock { max: 3 }.to_string(),
            "Cannot add more than 3 units of this product"
        );
        assert_eq!(
            CartError::ProductGone("Diver 300".into()).to_string(),
            "Product Diver 300 no longer exists"
        );
    }

    #[test]
    fn test_status_classification() {
        let status = |e: CartError| e.into_response().status();

        assert_eq!(status(CartError::cart_not_found()), StatusCode::NOT_FOUND);
        assert_eq!(status(CartError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(CartError::TotalTooLarge { max: 100 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(CartError::NotAbandoned), StatusCode::BAD_REQUEST);
        assert_eq!(status(CartError::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status(CartError::Database("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
