use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i32),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UserError::Validation(errors.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            UserError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::PasswordHash(msg) | UserError::Database(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
