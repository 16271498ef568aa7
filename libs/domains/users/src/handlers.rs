use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{AppError, ErrorResponse, JwtAuth, JwtClaims, ValidatedJson, jwt_auth_middleware};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, RegisterUser, TokenResponse, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(register, login, me),
    components(schemas(RegisterUser, LoginRequest, UserResponse, TokenResponse, ErrorResponse)),
    tags((name = TAG, description = "Registration and authentication"))
)]
pub struct ApiDoc;

struct UsersState<R: UserRepository> {
    service: UserService<R>,
    auth: JwtAuth,
}

/// Users router, mounted at `/users` by the app
pub fn router<R: UserRepository + 'static>(service: UserService<R>, auth: JwtAuth) -> Router {
    let state = Arc::new(UsersState {
        service,
        auth: auth.clone(),
    });

    let protected = Router::new()
        .route("/me", get(me::<R>))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/", post(register::<R>))
        .route("/login", post(login::<R>))
        .merge(protected)
        .with_state(state)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<TokenResponse>> {
    let user = state.service.login(input).await?;

    let issued = state
        .auth
        .issue_access_token(user.user_id, &user.email, &user.name, user.is_admin)
        .map_err(|e| UserError::Internal(format!("Failed to issue token: {}", e)))?;

    tracing::info!(user_id = user.user_id, is_admin = user.is_admin, "User logged in");

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        user: user.into(),
    }))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn me<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid token subject".to_string()))?;

    Ok(Json(state.service.get_user(user_id).await?))
}
