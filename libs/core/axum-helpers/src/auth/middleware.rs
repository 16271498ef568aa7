use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// `Authorization: Bearer <token>` first, then the `access_token` cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .find_map(|cookie| {
                let (name, value) = cookie.trim().split_once('=')?;
                (name == ACCESS_TOKEN_COOKIE && !value.is_empty()).then_some(value)
            })
    })
}

/// Rejects requests without a valid token and stores the decoded
/// [`JwtClaims`](super::JwtClaims) in the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = extract_token_from_request(request.headers()).ok_or_else(|| {
            tracing::debug!("No JWT found in Authorization header or cookie");
            AppError::Unauthorized("No token provided".to_string())
        })?;

        auth.verify_token(token).map_err(|e| {
            tracing::debug!("JWT verification failed: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
