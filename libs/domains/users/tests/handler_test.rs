//! Handler tests for the Users domain

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum_helpers::{Actor, JwtAuth, JwtConfig, Role};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use storage::InMemoryStorage;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    repository: InMemoryUserRepository,
    storage: InMemoryStorage,
}

impl TestApp {
    fn new() -> Self {
        Self {
            repository: InMemoryUserRepository::new(),
            storage: InMemoryStorage::new(),
        }
    }

    fn router(&self) -> Router {
        let jwt = JwtAuth::new(&JwtConfig::new("handler-test-secret-0123456789abcdef", 7).unwrap());
        let service = UserService::new(
            self.repository.clone(),
            Arc::new(self.storage.clone()),
            jwt,
        );
        handlers::router(service)
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.call(request).await;
        (status, body)
    }

    /// Register an account and return its session actor
    async fn register(&self, name: &str, email: &str) -> Actor {
        let (status, body) = self
            .send(request(
                "POST",
                "/register",
                None,
                Some(json!({"name": name, "email": email, "password": "secret1"})),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        Actor {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            name: name.to_string(),
            email: email.to_lowercase(),
            role: Role::User,
        }
    }
}

fn admin() -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Root".to_string(),
        email: "root@example.com".to_string(),
        role: Role::Admin,
    }
}

fn request(method: &str, uri: &str, actor: Option<&Actor>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.extension(actor.clone());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn address(name: &str) -> Value {
    json!({
        "name": name,
        "street": "1 Rue du Rhône",
        "city": "Geneva",
        "state": "GE",
        "zip_code": "1204",
        "country": "CH"
    })
}

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let app = TestApp::new();

    let (status, headers, body) = app
        .call(request(
            "POST",
            "/register",
            None,
            Some(json!({"name": "Ada", "email": "Ada@Example.com", "password": "secret1"})),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body.get("password_hash").is_none());

    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("token={}", body["token"].as_str().unwrap())));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_register_duplicate_and_invalid() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .send(request(
            "POST",
            "/register",
            None,
            Some(json!({"name": "Ada", "email": "ADA@example.com", "password": "secret1"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");

    let (status, _) = app
        .send(request(
            "POST",
            "/register",
            None,
            Some(json!({"name": "Bob", "email": "bob@example.com", "password": "123"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_checks_password() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .send(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-pass"})),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = app
        .send(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "secret1"})),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, headers, body) = app
        .call(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "ADA@example.com", "password": "secret1"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada");
    assert!(headers.contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = TestApp::new();
    let (status, headers, _) = app.call(request("POST", "/logout", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.ends_with("Max-Age=0"));
}

#[tokio::test]
async fn test_profile_requires_session() {
    let app = TestApp::new();
    let (status, _) = app.send(request("GET", "/profile", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ada = app.register("Ada", "ada@example.com").await;
    let (status, body) = app
        .send(request(
            "PUT",
            "/profile",
            Some(&ada),
            Some(json!({"name": "Ada Lovelace", "phone": "+41 22 000 00 00"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_profile_email_must_stay_unique() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;
    let bob = app.register("Bob", "bob@example.com").await;

    let (status, _) = app
        .send(request(
            "PUT",
            "/profile",
            Some(&bob),
            Some(json!({"email": "ada@example.com"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_address_book_keeps_single_default() {
    let app = TestApp::new();
    let ada = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .send(request("POST", "/addresses", Some(&ada), Some(address("Home"))))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[0]["is_default"], true);

    let (_, body) = app
        .send(request("POST", "/addresses", Some(&ada), Some(address("Office"))))
        .await;
    assert_eq!(body[1]["is_default"], false);
    let office = body[1]["id"].as_str().unwrap().to_string();
    let home = body[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(request(
            "PUT",
            &format!("/addresses/{office}/default"),
            Some(&ada),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["is_default"], false);
    assert_eq!(body[1]["is_default"], true);

    let (_, body) = app
        .send(request("DELETE", &format!("/addresses/{office}"), Some(&ada), None))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], home);
    assert_eq!(body[0]["is_default"], true);

    let (status, body) = app
        .send(request(
            "DELETE",
            &format!("/addresses/{}", Uuid::now_v7()),
            Some(&ada),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Address not found");
}

#[tokio::test]
async fn test_wishlist_add_and_remove() {
    let app = TestApp::new();
    let ada = app.register("Ada", "ada@example.com").await;
    let product = Uuid::now_v7();
    let uri = format!("/wishlist/{product}");

    app.send(request("POST", &uri, Some(&ada), None)).await;
    let (status, body) = app.send(request("POST", &uri, Some(&ada), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([product.to_string()]));

    let (_, body) = app.send(request("DELETE", &uri, Some(&ada), None)).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_upload_profile_image() {
    let app = TestApp::new();
    let ada = app.register("Ada", "ada@example.com").await;

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"avatar.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nabc\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/profile/image")
        .extension(ada)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["profile_image"].as_str().unwrap();
    assert!(url.contains("/profiles/"));
    assert_eq!(app.storage.len().await, 1);
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new();
    let ada = app.register("Ada", "ada@example.com").await;
    app.register("Bob", "bob@example.com").await;

    let (status, _) = app.send(request("GET", "/", Some(&ada), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root = admin();
    let (status, body) = app
        .send(request("GET", "/?search=bob", Some(&root), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Bob");

    let uri = format!("/{}", ada.id);
    let (status, body) = app
        .send(request(
            "PUT",
            &uri,
            Some(&root),
            Some(json!({"role": "admin", "is_active": false})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["is_active"], false);

    // Deactivated accounts cannot sign in
    let (status, _) = app
        .send(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "secret1"})),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(request("DELETE", &uri, Some(&root), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(request("GET", &uri, Some(&root), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
