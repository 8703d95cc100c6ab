//! Handler tests for the Categories and Brands APIs

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_helpers::{Actor, Role};
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use storage::InMemoryStorage;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    categories: InMemoryCategoryRepository,
    brands: InMemoryBrandRepository,
    usage: InMemoryBrandUsage,
    storage: InMemoryStorage,
}

impl TestApp {
    fn new() -> Self {
        Self {
            categories: InMemoryCategoryRepository::new(),
            brands: InMemoryBrandRepository::new(),
            usage: InMemoryBrandUsage::new(),
            storage: InMemoryStorage::new(),
        }
    }

    fn router(&self) -> Router {
        let storage = Arc::new(self.storage.clone());
        Router::new()
            .nest(
                "/categories",
                handlers::categories_router(CategoryService::new(
                    self.categories.clone(),
                    storage.clone(),
                )),
            )
            .nest(
                "/brands",
                handlers::brands_router(BrandService::new(
                    self.brands.clone(),
                    Arc::new(self.usage.clone()),
                    storage,
                )),
            )
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, created) = self
            .send(request("POST", uri, Some(&admin()), Some(body)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created
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

fn id_of(value: &Value) -> &str {
    value["_id"].as_str().unwrap()
}

#[tokio::test]
async fn test_category_tree_hides_inactive_for_shoppers() {
    let app = TestApp::new();
    let sport = app.create("/categories", json!({"name": "Sport"})).await;
    app.create(
        "/categories",
        json!({"name": "Diver", "parent_id": id_of(&sport)}),
    )
    .await;
    app.create(
        "/categories",
        json!({"name": "Pilot", "parent_id": id_of(&sport), "is_active": false}),
    )
    .await;
    app.create("/categories", json!({"name": "Archive", "is_active": false}))
        .await;

    let (status, tree) = app.send(request("GET", "/categories", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree.as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["name"], "Sport");
    assert_eq!(tree[0]["subcategories"].as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["subcategories"][0]["name"], "Diver");

    let (_, tree) = app
        .send(request("GET", "/categories", Some(&admin()), None))
        .await;
    assert_eq!(tree.as_array().unwrap().len(), 2);

    let (_, all) = app.send(request("GET", "/categories/all", None, None)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_category_duplicate_name() {
    let app = TestApp::new();
    app.create("/categories", json!({"name": "Dress"})).await;

    let (status, body) = app
        .send(request(
            "POST",
            "/categories",
            Some(&admin()),
            Some(json!({"name": "Dress"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category already exists");
}

#[tokio::test]
async fn test_delete_parent_category_is_blocked() {
    let app = TestApp::new();
    let sport = app.create("/categories", json!({"name": "Sport"})).await;
    let diver = app
        .create(
            "/categories",
            json!({"name": "Diver", "parent_id": id_of(&sport)}),
        )
        .await;

    let uri = format!("/categories/{}", id_of(&sport));
    let (status, body) = app.send(request("DELETE", &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot delete category with subcategories. Please delete or reassign subcategories first."
    );

    let child = format!("/categories/{}", id_of(&diver));
    let (status, _) = app.send(request("DELETE", &child, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(request("DELETE", &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_inactive_category_is_not_found_for_shoppers() {
    let app = TestApp::new();
    let archive = app
        .create("/categories", json!({"name": "Archive", "is_active": false}))
        .await;
    let uri = format!("/categories/{}", id_of(&archive));

    let (status, _) = app.send(request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_writes_require_admin() {
    let app = TestApp::new();
    let shopper = Actor {
        role: Role::User,
        ..admin()
    };

    let (status, _) = app
        .send(request(
            "POST",
            "/categories",
            Some(&shopper),
            Some(json!({"name": "Dress"})),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_brand_listing_and_featured() {
    let app = TestApp::new();
    app.create("/brands", json!({"name": "Zenith", "featured": true}))
        .await;
    app.create(
        "/brands",
        json!({"name": "Breguet", "featured": true, "is_active": false}),
    )
    .await;
    app.create("/brands", json!({"name": "Longines", "founded_year": 1832}))
        .await;

    let (status, brands) = app.send(request("GET", "/brands", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = brands
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Longines", "Zenith"]);

    let (_, featured) = app
        .send(request("GET", "/brands/featured", Some(&admin()), None))
        .await;
    assert_eq!(featured.as_array().unwrap().len(), 1);
    assert_eq!(featured[0]["name"], "Zenith");
}

#[tokio::test]
async fn test_brand_validation_and_duplicates() {
    let app = TestApp::new();
    app.create("/brands", json!({"name": "Omega"})).await;

    let (status, body) = app
        .send(request(
            "POST",
            "/brands",
            Some(&admin()),
            Some(json!({"name": "Omega"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Brand already exists");

    let (status, _) = app
        .send(request(
            "POST",
            "/brands",
            Some(&admin()),
            Some(json!({"name": "Tudor", "website": "not a url"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_brand_with_products_is_blocked() {
    let app = TestApp::new();
    let omega = app.create("/brands", json!({"name": "Omega"})).await;
    let id: Uuid = id_of(&omega).parse().unwrap();
    app.usage.set(id, 4).await;

    let uri = format!("/brands/{id}");
    let (status, body) = app.send(request("DELETE", &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete brand with associated products");

    app.usage.set(id, 0).await;
    let (status, _) = app.send(request("DELETE", &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_upload_brand_logo_replaces_previous() {
    let app = TestApp::new();
    let omega = app.create("/brands", json!({"name": "Omega"})).await;
    let uri = format!("/brands/{}/logo", id_of(&omega));

    let upload = |file_name: &str| {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\nabc\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(&uri)
            .extension(admin())
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    };

    let (status, first) = app.send(upload("one.png")).await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert!(first["logo"].as_str().unwrap().contains("/brands/"));

    let (_, second) = app.send(upload("two.png")).await;
    assert!(second["logo"].as_str().unwrap().ends_with("-two.png"));
    assert_eq!(app.storage.len().await, 1);
    assert_eq!(
        app.storage.deleted().await,
        vec![first["logo"].as_str().unwrap().to_string()]
    );
}
