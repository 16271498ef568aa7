//! Handler tests for the products domain
//!
//! These run the products router against in-memory stores and a recording
//! notification gateway:
//! - multipart and JSON request handling
//! - status codes and error bodies
//! - token-protected routes

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_helpers::{ErrorResponse, JwtAuth, JwtConfig};
use domain_notifications::{NotificationDispatcher, RecordingGateway};
use domain_products::*;
use domain_users::{InMemoryUserRepository, NewUser, User, UserRepository};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // For oneshot()

const BOUNDARY: &str = "marketplace-test-boundary";
const UPLOAD_LIMIT: usize = 1024 * 1024;

struct TestApp {
    router: Router,
    users: InMemoryUserRepository,
    gateway: RecordingGateway,
    auth: JwtAuth,
    upload_dir: std::path::PathBuf,
}

impl TestApp {
    fn new() -> Self {
        let users = InMemoryUserRepository::new();
        let gateway = RecordingGateway::new();
        let auth = JwtAuth::new(&JwtConfig::new("products-handler-test-secret-0123456789").unwrap());
        let upload_dir = std::env::temp_dir().join(format!("marketplace-handler-{}", uuid::Uuid::new_v4()));

        let service = ProductService::new(
            InMemoryProductRepository::new(users.clone()),
            Arc::new(users.clone()),
            NotificationDispatcher::new(Arc::new(gateway.clone()), Duration::from_secs(1)),
        );
        let router = handlers::router(
            service,
            Arc::new(LocalImageStore::new(&upload_dir)),
            auth.clone(),
            UPLOAD_LIMIT,
        );

        Self {
            router,
            users,
            gateway,
            auth,
            upload_dir,
        }
    }

    async fn user(&self, name: &str, is_admin: bool) -> User {
        self.users
            .create(NewUser {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                contact_number: Some("+1 555 0100".into()),
                password_hash: "unused".into(),
                is_admin,
            })
            .await
            .unwrap()
    }

    fn bearer(&self, user: &User) -> String {
        let issued = self
            .auth
            .issue_access_token(user.user_id, &user.email, &user.name, user.is_admin)
            .unwrap();
        format!("Bearer {}", issued.token)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create(&self, owner: &User, model_name: &str, image: Option<(&str, &[u8])>) -> StatusCode {
        self.post_form(owner, multipart_body(model_name, image)).await.0
    }

    async fn post_form(&self, owner: &User, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::AUTHORIZATION, self.bearer(owner))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn stored_images(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn text_part(name: &str, value: &str) -> String {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
}

fn multipart_body(model_name: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    multipart_form(model_name, "420.5", image)
}

fn multipart_form(model_name: &str, price: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = String::new();
    body.push_str(&text_part("modelName", model_name));
    body.push_str(&text_part("description", "Mint condition"));
    body.push_str(&text_part("price", price));
    body.push_str(&text_part("quantity", "3"));

    let mut bytes = body.into_bytes();
    if let Some((filename, content)) = image {
        bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(content);
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    bytes
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn update_request(id: i32, token: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/{id}"))
        .header(header::AUTHORIZATION, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "modelName": "Updated",
                "description": "Now cheaper",
                "price": 99.0,
                "quantity": 1
            })
            .to_string(),
        ))
        .unwrap()
}

fn delete_request(id: i32, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/{id}"))
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_returns_201_and_listing_is_public() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    assert_eq!(app.create(&owner, "Gibson SG", None).await, StatusCode::CREATED);

    let (status, body) = app.send(get("/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productId"], 1);
    assert_eq!(body["userId"], owner.user_id);
    assert_eq!(body["modelName"], "Gibson SG");
    assert_eq!(body["price"], 420.5);
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["isFeaturedAd"], false);
    assert!(body.get("imageUri").is_none());
    assert_eq!(body["user"]["contactNumber"], "+1 555 0100");
}

#[tokio::test]
async fn test_create_message_body() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::AUTHORIZATION, app.bearer(&owner))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("Amp", None)))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "Product created successfully" }));
}

#[tokio::test]
async fn test_create_with_image_sets_uri() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    let status = app
        .create(&owner, "Fender", Some(("guitar.JPG", &b"\xff\xd8\xff"[..])))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.send(get("/1")).await;
    let uri = body["imageUri"].as_str().unwrap();
    assert!(uri.starts_with("/uploads/"));
    assert!(uri.ends_with(".jpg"));
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("Amp", None)))
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_endpoints_and_empty_results() {
    let app = TestApp::new();
    let dora = app.user("Dora", false).await;
    app.create(&dora, "Amp", None).await;
    app.create(&dora, "Pedal", None).await;

    let (status, all) = app.send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, by_name) = app.send(get("/name/Pedal")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name[0]["modelName"], "Pedal");

    let (status, body) = app.send(get("/name/nonexistent")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No products found with this name");

    let (status, by_user) = app.send(get(&format!("/user/{}", dora.user_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_user.as_array().unwrap().len(), 2);

    let (status, body) = app.send(get("/user/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No products found for this user");
}

#[tokio::test]
async fn test_get_invalid_and_missing_id() {
    let app = TestApp::new();

    let (status, _) = app.send(get("/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(get("/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.error, "NOT_FOUND");
    assert_eq!(error.message, "Product not found");
}

#[tokio::test]
async fn test_update_owner_ok_admin_forbidden() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;
    let admin = app.user("Root", true).await;
    app.create(&owner, "Amp", None).await;

    let (status, body) = app.send(update_request(1, &app.bearer(&admin))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(body["message"], "User is not authorized");

    let (status, body) = app.send(update_request(1, &app.bearer(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");

    let (_, listing) = app.send(get("/1")).await;
    assert_eq!(listing["modelName"], "Updated");
    assert_eq!(listing["price"], 99.0);
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    let (status, _) = app.send(update_request(5, &app.bearer(&owner))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_delete_notifies_owner() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;
    let admin = app.user("Root", true).await;
    app.create(&owner, "Amp", None).await;

    let (status, body) = app.send(delete_request(1, &app.bearer(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Product deleted successfully and notification sent to the user."
    );

    assert!(app.gateway.wait_for_count(1, Duration::from_secs(1)).await);
    let sent = app.gateway.sent().await;
    assert_eq!(sent[0].to, "dora@example.com");

    let (status, _) = app.send(delete_request(1, &app.bearer(&admin))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stranger_delete_forbidden() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;
    let stranger = app.user("Eve", false).await;
    app.create(&owner, "Amp", None).await;

    let (status, _) = app.send(delete_request(1, &app.bearer(&stranger))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(get("/1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_rejects_non_finite_price() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    for price in ["NaN", "inf", "-inf"] {
        let (status, body) = app.post_form(&owner, multipart_form("Amp", price, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price={price}");
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    let (_, listings) = app.send(get("/")).await;
    assert_eq!(listings, json!([]));
}

#[tokio::test]
async fn test_invalid_create_stores_no_image() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    let body = multipart_form("", "420.5", Some(("guitar.jpg", &b"\xff\xd8\xff"[..])));
    let (status, _) = app.post_form(&owner, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_images(), 0);

    let (_, listings) = app.send(get("/")).await;
    assert_eq!(listings, json!([]));
}

#[tokio::test]
async fn test_create_over_upload_limit_is_413() {
    let app = TestApp::new();
    let owner = app.user("Dora", false).await;

    let image = vec![0u8; UPLOAD_LIMIT + 1];
    let (status, body) = app
        .post_form(&owner, multipart_form("Amp", "420.5", Some(("big.png", &image[..]))))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.error, "PAYLOAD_TOO_LARGE");
    assert_eq!(app.stored_images(), 0);
}
