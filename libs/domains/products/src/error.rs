use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_users::UserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("No products named '{0}'")]
    NoProductsNamed(String),

    #[error("No products for user {0}")]
    NoProductsForUser(i32),

    #[error("User {user_id} may not modify product {product_id}")]
    Forbidden { user_id: i32, product_id: i32 },

    /// The listing exists but its owner row does not
    #[error("Owner {user_id} of product {product_id} not found")]
    OwnerNotFound { user_id: i32, product_id: i32 },

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Image upload failed: {0}")]
    Image(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::NoProductsNamed(_) => {
                AppError::NotFound("No products found with this name".to_string())
            }
            ProductError::NoProductsForUser(_) => {
                AppError::NotFound("No products found for this user".to_string())
            }
            ProductError::Forbidden { .. } => {
                AppError::Forbidden("User is not authorized".to_string())
            }
            ProductError::OwnerNotFound { .. } => {
                AppError::DataIntegrity("User not found".to_string())
            }
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::BadRequest(msg) => AppError::BadRequest(msg),
            ProductError::PayloadTooLarge(msg) => AppError::PayloadTooLarge(msg),
            ProductError::Image(msg) | ProductError::Database(msg) | ProductError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for ProductError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}

/// Directory lookups made on behalf of a product operation
impl From<UserError> for ProductError {
    fn from(err: UserError) -> Self {
        ProductError::Internal(format!("User directory error: {}", err))
    }
}
