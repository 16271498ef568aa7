pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1007,
///   "error": "FORBIDDEN",
///   "message": "User is not authorized",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details such as validation field errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type rendered as an [`ErrorResponse`].
///
/// Domain crates convert their own errors into this type at the HTTP boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Invalid path parameter: {0}")]
    InvalidPathParam(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Reported with a 404 status but its own error code
    #[error("Data integrity fault: {0}")]
    DataIntegrity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Io(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::InvalidPathParam(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::DataIntegrity(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::InvalidPathParam(_) => ErrorCode::InvalidPathParam,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::DataIntegrity(_) => ErrorCode::DataIntegrityFault,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::PayloadTooLarge(_) => ErrorCode::PayloadTooLarge,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let (message, details) = match self {
            // Server-side failures never leak internals to the client
            AppError::Database(e) => {
                tracing::error!(error_code = code.code(), "Database error: {:?}", e);
                (code.default_message().to_string(), None)
            }
            AppError::Io(e) => {
                tracing::error!(error_code = code.code(), "I/O error: {:?}", e);
                (code.default_message().to_string(), None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                (code.default_message().to_string(), None)
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
                (e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {:?}", e);
                (
                    code.default_message().to_string(),
                    serde_json::to_value(&e).ok(),
                )
            }
            AppError::DataIntegrity(msg) => {
                tracing::error!(error_code = code.code(), "Data integrity fault: {}", msg);
                (msg, None)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", msg);
                (msg, None)
            }
            AppError::BadRequest(msg)
            | AppError::InvalidPathParam(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg) => {
                tracing::info!(error_code = code.code(), status = %status, "{}", msg);
                (msg, None)
            }
        };

        let mut body = ErrorResponse::new(code, message);
        body.details = details;

        (status, Json(body)).into_response()
    }
}
