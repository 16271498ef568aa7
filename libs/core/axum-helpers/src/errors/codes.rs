//! Error codes carried in every error body.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer for
//! logs and dashboards, and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::DataIntegrityFault;
//! assert_eq!(code.as_str(), "DATA_INTEGRITY_FAULT");
//! assert_eq!(code.code(), 1013);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    BadRequest,
    ValidationError,
    InvalidPathParam,
    JsonExtraction,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    PayloadTooLarge,
    /// A record references an entity that no longer exists
    DataIntegrityFault,

    // Server errors
    InternalError,
    ServiceUnavailable,

    // Database errors (2000-2999)
    DatabaseError,

    // I/O errors (4000s)
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidPathParam => "INVALID_PATH_PARAM",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::DataIntegrityFault => "DATA_INTEGRITY_FAULT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::IoError => "IO_ERROR",
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1000,
            Self::ValidationError => 1001,
            Self::InvalidPathParam => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::ServiceUnavailable => 1011,
            Self::PayloadTooLarge => 1012,
            Self::DataIntegrityFault => 1013,
            Self::DatabaseError => 2003,
            Self::IoError => 4001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Malformed request",
            Self::ValidationError => "Request validation failed",
            Self::InvalidPathParam => "Invalid path parameter",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "User is not authorized",
            Self::Conflict => "Resource already exists",
            Self::PayloadTooLarge => "Payload too large",
            Self::DataIntegrityFault => "Referenced record is missing",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database error occurred",
            Self::IoError => "I/O error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
