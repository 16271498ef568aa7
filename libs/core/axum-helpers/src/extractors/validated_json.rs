//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the body as JSON, then runs [`Validate::validate`].
///
/// ```ignore
/// async fn update(ValidatedJson(payload): ValidatedJson<UpdateProduct>) -> StatusCode {
///     StatusCode::OK
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
