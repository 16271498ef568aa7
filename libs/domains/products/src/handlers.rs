//! HTTP handlers for the Products API

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, AppResult, ErrorResponse, IdPath, JwtAuth, JwtClaims, ValidatedJson,
    jwt_auth_middleware,
};
use domain_users::UserRepository;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    Actor, CreateProduct, MessageResponse, OwnerContact, Product, ProductListing, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::uploads::ImageStore;

pub const TAG: &str = "products";

pub const CREATED_MESSAGE: &str = "Product created successfully";
pub const UPDATED_MESSAGE: &str = "Product updated successfully";
pub const DELETED_MESSAGE: &str = "Product deleted successfully and notification sent to the user.";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        products_by_name,
        products_by_user,
        get_product,
        create_product,
        update_product,
        delete_product,
    ),
    components(schemas(
        Product, ProductListing, OwnerContact, ProductUpload, UpdateProduct, MessageResponse,
        ErrorResponse
    )),
    tags((name = TAG, description = "Marketplace listings"))
)]
pub struct ApiDoc;

/// Multipart form accepted when creating a listing
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ProductUpload {
    model_name: String,
    description: String,
    price: f64,
    quantity: i32,
    is_featured_ad: Option<bool>,
    /// Optional image file
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

struct ProductsState<R: ProductRepository, U: UserRepository> {
    service: ProductService<R, U>,
    images: Arc<dyn ImageStore>,
}

/// Products router, mounted at `/products` by the app.
///
/// Reads are public; create, update and delete need a valid token.
/// `upload_limit` caps the multipart body in bytes.
pub fn router<R, U>(
    service: ProductService<R, U>,
    images: Arc<dyn ImageStore>,
    auth: JwtAuth,
    upload_limit: usize,
) -> Router
where
    R: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    let state = Arc::new(ProductsState { service, images });

    let public = Router::new()
        .route("/", get(list_products::<R, U>))
        .route("/name/{model_name}", get(products_by_name::<R, U>))
        .route("/user/{user_id}", get(products_by_user::<R, U>))
        .route("/{id}", get(get_product::<R, U>));

    let protected = Router::new()
        .route(
            "/",
            post(create_product::<R, U>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/{id}",
            put(update_product::<R, U>).delete(delete_product::<R, U>),
        )
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    public.merge(protected).with_state(state)
}

fn actor(claims: &JwtClaims) -> AppResult<Actor> {
    Actor::from_claims(claims).ok_or_else(|| AppError::Unauthorized("Invalid token subject".to_string()))
}

/// List every listing with its owner's contact number
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All listings", body = Vec<ProductListing>)
    )
)]
async fn list_products<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
) -> ProductResult<Json<Vec<ProductListing>>> {
    Ok(Json(state.service.get_all_products().await?))
}

/// Listings with exactly this model name
#[utoipa::path(
    get,
    path = "/name/{model_name}",
    tag = TAG,
    params(("model_name" = String, Path, description = "Exact model name")),
    responses(
        (status = 200, description = "Matching listings", body = Vec<ProductListing>),
        (status = 404, description = "No products found with this name", body = ErrorResponse)
    )
)]
async fn products_by_name<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    Path(model_name): Path<String>,
) -> ProductResult<Json<Vec<ProductListing>>> {
    Ok(Json(state.service.get_products_by_name(&model_name).await?))
}

/// Listings owned by a user
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = TAG,
    params(("user_id" = i32, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "The user's listings", body = Vec<ProductListing>),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "No products found for this user", body = ErrorResponse)
    )
)]
async fn products_by_user<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    IdPath(user_id): IdPath,
) -> ProductResult<Json<Vec<ProductListing>>> {
    Ok(Json(state.service.get_user_products(user_id).await?))
}

/// Get a listing by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Listing found", body = ProductListing),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductListing>> {
    Ok(Json(state.service.get_product_by_id(id).await?))
}

/// Create a listing owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = MessageResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_product<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    Extension(claims): Extension<JwtClaims>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let actor = actor(&claims)?;
    let form = ProductForm::read(multipart).await?;
    let (input, image) = form.into_parts()?;
    // Nothing is written to the public uploads dir for a form that will be rejected
    input.validate().map_err(ProductError::from)?;

    let image_uri = match image {
        Some((filename, bytes)) => Some(state.images.save(&filename, &bytes).await?),
        None => None,
    };

    state.service.add_product(actor, input, image_uri).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new(CREATED_MESSAGE))))
}

/// Update the four mutable fields. Owner only.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_product<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    Extension(claims): Extension<JwtClaims>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> AppResult<Json<MessageResponse>> {
    state.service.update_product(actor(&claims)?, id, input).await?;
    Ok(Json(MessageResponse::new(UPDATED_MESSAGE)))
}

/// Delete a listing and tell its owner. Owner or admin.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 403, description = "Caller is neither owner nor admin", body = ErrorResponse),
        (status = 404, description = "Product or its owner not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_product<R: ProductRepository, U: UserRepository>(
    State(state): State<Arc<ProductsState<R, U>>>,
    Extension(claims): Extension<JwtClaims>,
    IdPath(id): IdPath,
) -> AppResult<Json<MessageResponse>> {
    state.service.delete_product(actor(&claims)?, id).await?;
    Ok(Json(MessageResponse::new(DELETED_MESSAGE)))
}

/// Raw multipart fields before validation
#[derive(Default)]
struct ProductForm {
    model_name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    quantity: Option<String>,
    is_featured_ad: Option<String>,
    image: Option<(String, Bytes)>,
}

fn multipart_error(err: MultipartError) -> ProductError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProductError::PayloadTooLarge(err.body_text())
    } else {
        ProductError::BadRequest(err.body_text())
    }
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> ProductResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.image = Some((filename, bytes));
                }
                continue;
            }

            let slot = match name.as_str() {
                "modelName" => &mut form.model_name,
                "description" => &mut form.description,
                "price" => &mut form.price,
                "quantity" => &mut form.quantity,
                "isFeaturedAd" => &mut form.is_featured_ad,
                other => {
                    tracing::debug!(field = other, "Ignoring unknown form field");
                    continue;
                }
            };
            *slot = Some(field.text().await.map_err(multipart_error)?);
        }

        Ok(form)
    }

    fn into_parts(self) -> ProductResult<(CreateProduct, Option<(String, Bytes)>)> {
        let input = CreateProduct {
            model_name: required(self.model_name, "modelName")?,
            description: required(self.description, "description")?,
            price: parse(self.price, "price")?,
            quantity: parse(self.quantity, "quantity")?,
            is_featured_ad: match self.is_featured_ad {
                Some(raw) => parse(Some(raw), "isFeaturedAd")?,
                None => false,
            },
        };
        Ok((input, self.image))
    }
}

fn required(value: Option<String>, field: &str) -> ProductResult<String> {
    value.ok_or_else(|| ProductError::BadRequest(format!("Missing form field '{field}'")))
}

fn parse<T: std::str::FromStr>(value: Option<String>, field: &str) -> ProductResult<T> {
    let raw = required(value, field)?;
    raw.trim()
        .parse()
        .map_err(|_| ProductError::BadRequest(format!("Invalid value for '{field}': {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            model_name: Some("Vespa".into()),
            description: Some("1978, runs".into()),
            price: Some(" 1500.50".into()),
            quantity: Some("1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_into_parts() {
        let (input, image) = form().into_parts().unwrap();
        assert_eq!(input.model_name, "Vespa");
        assert_eq!(input.price, 1500.5);
        assert!(!input.is_featured_ad);
        assert!(image.is_none());
    }

    #[test]
    fn test_form_rejects_missing_and_malformed() {
        let missing = ProductForm {
            description: None,
            ..form()
        };
        assert!(matches!(missing.into_parts(), Err(ProductError::BadRequest(msg)) if msg.contains("description")));

        let malformed = ProductForm {
            quantity: Some("many".into()),
            ..form()
        };
        assert!(matches!(malformed.into_parts(), Err(ProductError::BadRequest(msg)) if msg.contains("quantity")));
    }

    #[test]
    fn test_form_parses_featured_flag() {
        let featured = ProductForm {
            is_featured_ad: Some("true".into()),
            ..form()
        };
        assert!(featured.into_parts().unwrap().0.is_featured_ad);
    }
}
