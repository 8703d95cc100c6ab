//! Error codes reported in every failed response.
//!
//! A code has three faces: the identifier clients branch on (`"NOT_FOUND"`),
//! the integer that shows up in logs (`1004`) and a fallback message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    InvalidUuid,
    JsonExtraction,
    NotFound,
    InternalError,
    Unauthorized,
    Forbidden,
    /// Duplicate resource or concurrent modification
    Conflict,
    UnprocessableEntity,
    ServiceUnavailable,
    /// Business rule violated (out of stock, empty cart, ...)
    BadRequest,
    InvalidMultipart,
    DatabaseError,
    IoError,
    SerdeJsonError,
}

impl ErrorCode {
    /// `(identifier, log code, fallback message)`
    ///
    /// Log codes: 1xxx client, 2xxx database, 4xxx I/O, 5xxx serialization.
    fn parts(self) -> (&'static str, i32, &'static str) {
        match self {
            Self::ValidationError => ("VALIDATION_ERROR", 1001, "Request validation failed"),
            Self::InvalidUuid => ("INVALID_UUID", 1002, "Invalid UUID format"),
            Self::JsonExtraction => ("JSON_EXTRACTION", 1003, "Failed to parse request body"),
            Self::NotFound => ("NOT_FOUND", 1004, "Resource not found"),
            Self::InternalError => ("INTERNAL_ERROR", 1005, "An internal server error occurred"),
            Self::Unauthorized => ("UNAUTHORIZED", 1006, "Authentication required"),
            Self::Forbidden => ("FORBIDDEN", 1007, "Access forbidden"),
            Self::Conflict => ("CONFLICT", 1008, "Resource already exists"),
            Self::UnprocessableEntity => {
                ("UNPROCESSABLE_ENTITY", 1009, "Request cannot be processed")
            }
            Self::ServiceUnavailable => {
                ("SERVICE_UNAVAILABLE", 1011, "Service is temporarily unavailable")
            }
            Self::BadRequest => ("BAD_REQUEST", 1012, "Bad request"),
            Self::InvalidMultipart => {
                ("INVALID_MULTIPART", 1013, "Failed to read multipart upload")
            }
            Self::DatabaseError => ("DATABASE_ERROR", 2003, "Database error occurred"),
            Self::IoError => ("IO_ERROR", 4001, "I/O error occurred"),
            Self::SerdeJsonError => ("SERDE_JSON_ERROR", 5001, "JSON serialization error"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.parts().0
    }

    pub fn code(&self) -> i32 {
        self.parts().1
    }

    /// Used when the error carries no message of its own, and for every 5xx.
    pub fn default_message(&self) -> &'static str {
        self.parts().2
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 15] = [
        ErrorCode::ValidationError,
        ErrorCode::InvalidUuid,
        ErrorCode::JsonExtraction,
        ErrorCode::NotFound,
        ErrorCode::InternalError,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::Conflict,
        ErrorCode::UnprocessableEntity,
        ErrorCode::ServiceUnavailable,
        ErrorCode::BadRequest,
        ErrorCode::InvalidMultipart,
        ErrorCode::DatabaseError,
        ErrorCode::IoError,
        ErrorCode::SerdeJsonError,
    ];

    #[test]
    fn test_identifier_matches_serde_name() {
        for code in ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_log_codes_are_unique() {
        let mut codes: Vec<i32> = ALL.iter().map(ErrorCode::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(ErrorCode::Conflict.code(), 1008);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
        assert_eq!(ErrorCode::Forbidden.to_string(), "FORBIDDEN");
    }
}
