//! Handler tests for the Cart domain
//!
//! Drive the real routers with in-memory repositories. The authenticated user is
//! injected as a request extension, the way the JWT middleware does it.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_helpers::{Actor, Role};
use chrono::{Duration, Utc};
use domain_cart::*;
use email::{Mailer, MockSmtpProvider, TemplateEngine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    carts: InMemoryCartRepository,
    catalog: InMemoryProductCatalog,
    customers: InMemoryCustomerDirectory,
    provider: MockSmtpProvider,
}

impl TestApp {
    fn new() -> Self {
        Self {
            carts: InMemoryCartRepository::new(),
            catalog: InMemoryProductCatalog::new(),
            customers: InMemoryCustomerDirectory::new(),
            provider: MockSmtpProvider::new(),
        }
    }

    fn cart_router(&self) -> Router {
        let service = CartService::new(self.carts.clone(), Arc::new(self.catalog.clone()));
        handlers::router(service)
    }

    fn admin_router(&self) -> Router {
        let mailer = Mailer::new(
            Arc::new(self.provider.clone()),
            TemplateEngine::new().unwrap(),
        );
        let service = AbandonmentService::new(
            self.carts.clone(),
            Arc::new(self.customers.clone()),
            mailer,
            "https://shop.example.com",
        );
        handlers::admin_router(service)
    }

    async fn product(&self, price: i64, stock: i32) -> ProductSnapshot {
        let product = ProductSnapshot {
            id: Uuid::now_v7(),
            name: format!("Watch {}", price),
            price,
            discount_price: None,
            stock,
            images: vec!["https://cdn.example.com/products/watch.jpg".to_string()],
            is_active: true,
        };
        self.catalog.insert(product.clone()).await;
        product
    }
}

fn actor(role: Role) -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Jane".to_string(),
        email: "jane@example.com".to_string(),
        role,
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

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_cart_requires_login() {
    let app = TestApp::new();

    let response = app
        .cart_router()
        .oneshot(request("GET", "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_cart_creates_empty_cart() {
    let app = TestApp::new();
    let user = actor(Role::User);

    let response = app
        .cart_router()
        .oneshot(request("GET", "/", Some(&user), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], json!(user.id));
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_price"], 0);
}

#[tokio::test]
async fn test_add_merges_and_keeps_total() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(2_500, 10).await;

    for quantity in [1, 2] {
        let response = app
            .cart_router()
            .oneshot(request(
                "POST",
                "/",
                Some(&user),
                Some(json!({ "product_id": product.id, "quantity": quantity })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id })),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;

    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 4);
    assert_eq!(body["total_price"], 10_000);
}

#[tokio::test]
async fn test_add_beyond_stock_reports_maximum() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(2_500, 3).await;

    let add = |quantity: i32| {
        request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": quantity })),
        )
    };

    let response = app.cart_router().oneshot(add(2)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.cart_router().oneshot(add(2)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Cannot add more than 3 units of this product");

    let response = app.cart_router().oneshot(add(5)).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(
        body["message"],
        "Product is out of stock or has insufficient quantity"
    );

    let cart = app.carts.find_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.total_price(), 5_000);
}

#[tokio::test]
async fn test_add_rejects_unknown_fields() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(1_000, 3).await;

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "price": 1 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_remove_items() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(1_000, 10).await;

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 1 })),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let item_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .cart_router()
        .oneshot(request(
            "PUT",
            &format!("/{}", item_id),
            Some(&user),
            Some(json!({ "quantity": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Quantity must be at least 1");

    let response = app
        .cart_router()
        .oneshot(request(
            "PUT",
            &format!("/{}", item_id),
            Some(&user),
            Some(json!({ "quantity": 4 })),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["total_price"], 4_000);

    let response = app
        .cart_router()
        .oneshot(request(
            "PUT",
            &format!("/{}", Uuid::now_v7()),
            Some(&user),
            Some(json!({ "quantity": 1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "Item not found in cart");

    let response = app
        .cart_router()
        .oneshot(request("DELETE", &format!("/{}", item_id), Some(&user), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_price"], 0);
}

#[tokio::test]
async fn test_remove_without_cart_is_not_found() {
    let app = TestApp::new();
    let user = actor(Role::User);

    let response = app
        .cart_router()
        .oneshot(request("DELETE", &format!("/{}", Uuid::now_v7()), Some(&user), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "Cart not found");
}

#[tokio::test]
async fn test_malformed_item_id() {
    let app = TestApp::new();
    let user = actor(Role::User);

    let response = app
        .cart_router()
        .oneshot(request("DELETE", "/not-a-uuid", Some(&user), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(1_000, 10).await;

    app.cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 3 })),
        ))
        .await
        .unwrap();

    let response = app
        .cart_router()
        .oneshot(request("DELETE", "/", Some(&user), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_price"], 0);
}

#[tokio::test]
async fn test_checkout_prices_order_and_keeps_stock() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(5_000, 10).await;

    app.cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 1 })),
        ))
        .await
        .unwrap();

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/checkout",
            Some(&user),
            Some(json!({
                "shipping_address": {
                    "street": "1 Main St",
                    "city": "Springfield",
                    "zip_code": "62701",
                    "country": "US"
                },
                "payment_method": "card"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let draft = &body["order_draft"];
    assert_eq!(draft["items_price"], 5_000);
    assert_eq!(draft["tax_price"], 750);
    assert_eq!(draft["shipping_price"], 1_000);
    assert_eq!(draft["total_price"], 6_750);
    assert_eq!(draft["order_items"][0]["quantity"], 1);
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);

    let stock = app.catalog.find_product(product.id).await.unwrap().unwrap().stock;
    assert_eq!(stock, 10);
}

#[tokio::test]
async fn test_checkout_errors() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let checkout = |body: Value| request("POST", "/checkout", Some(&user), Some(body));

    let response = app
        .cart_router()
        .oneshot(checkout(json!({ "payment_method": "card" })))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await["message"],
        "Shipping address and payment method are required"
    );

    let full = json!({
        "shipping_address": {
            "street": "1 Main St",
            "city": "Springfield",
            "zip_code": "62701",
            "country": "US"
        },
        "payment_method": "card"
    });
    let response = app.cart_router().oneshot(checkout(full.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Cart is empty");

    let product = app.product(1_000, 5).await;
    app.cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 2 })),
        ))
        .await
        .unwrap();
    app.catalog.remove(product.id).await;

    let response = app.cart_router().oneshot(checkout(full)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["message"],
        format!("Product {} no longer exists", product.name)
    );
}

async fn seed_abandonable_cart(app: &TestApp, hours_idle: i64) -> Cart {
    let owner = actor(Role::User);
    app.customers
        .insert(Customer {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
        })
        .await;

    let product = app.product(4_000, 10).await;
    let mut cart = Cart::new(owner.id);
    cart.add(&product, 2).unwrap();
    cart.last_active = Utc::now() - Duration::hours(hours_idle);
    app.carts.seed(cart.clone()).await;
    cart
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new();
    let user = actor(Role::User);

    let response = app
        .admin_router()
        .oneshot(request("GET", "/abandoned", Some(&user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .admin_router()
        .oneshot(request("GET", "/abandoned", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sweep_list_stats_and_recover() {
    let app = TestApp::new();
    let admin = actor(Role::Admin);
    let stale = seed_abandonable_cart(&app, 30).await;
    seed_abandonable_cart(&app, 2).await;

    // Sweep with the default threshold, twice
    for expected in [1, 0] {
        let response = app
            .admin_router()
            .oneshot(request("POST", "/mark-abandoned", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["modified_count"], expected);
    }

    let response = app
        .admin_router()
        .oneshot(request("GET", "/abandoned", Some(&admin), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user"]["email"], "jane@example.com");

    let response = app
        .admin_router()
        .oneshot(request("GET", "/abandoned/stats", Some(&admin), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total_abandoned"], 1);
    assert_eq!(body["abandoned_last_24_hours"], 1);
    assert_eq!(body["total_value"], 8_000);
    assert_eq!(body["average_value"], 8_000);

    let recover_uri = format!("/{}/recover", stale.id);
    let response = app
        .admin_router()
        .oneshot(request("POST", &recover_uri, Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Recovery email sent to jane@example.com");
    assert_eq!(body["cart"]["is_abandoned"], false);
    assert!(app.provider.was_sent_to("jane@example.com").await);

    let response = app
        .admin_router()
        .oneshot(request("POST", &recover_uri, Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["message"],
        "This cart is not marked as abandoned"
    );
}

#[tokio::test]
async fn test_sweep_with_explicit_hours() {
    let app = TestApp::new();
    let admin = actor(Role::Admin);
    seed_abandonable_cart(&app, 3).await;

    let response = app
        .admin_router()
        .oneshot(request(
            "POST",
            "/mark-abandoned",
            Some(&admin),
            Some(json!({ "hours": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["message"], "1 carts marked as abandoned");

    let response = app
        .admin_router()
        .oneshot(request(
            "POST",
            "/mark-abandoned",
            Some(&admin),
            Some(json!({ "hours": -1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recover_unknown_cart() {
    let app = TestApp::new();
    let admin = actor(Role::Admin);

    let response = app
        .admin_router()
        .oneshot(request(
            "POST",
            &format!("/{}/recover", Uuid::now_v7()),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "Cart not found");
}

#[tokio::test]
async fn test_unit_price_is_fixed_when_added() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(2_500, 10).await;
    let product_id = product.id;

    let add = |quantity: i32| {
        request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product_id, "quantity": quantity })),
        )
    };

    let response = app.cart_router().oneshot(add(2)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.catalog
        .insert(ProductSnapshot {
            price: 9_999,
            ..product
        })
        .await;

    let response = app
        .cart_router()
        .oneshot(request("GET", "/", Some(&user), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["items"][0]["unit_price"], 2_500);
    assert_eq!(body["total_price"], 5_000);

    let response = app.cart_router().oneshot(add(1)).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["unit_price"], 2_500);
    assert_eq!(body["total_price"], 7_500);
}

#[tokio::test]
async fn test_add_with_overflowing_price_is_rejected() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(i64::MAX / 2, 10).await;

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 3 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Cart total cannot exceed 1000000000000 cents");

    let cart = app.carts.find_by_user(user.id).await.unwrap().unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_price(), 0);
}

#[tokio::test]
async fn test_failed_first_add_leaves_no_cart() {
    let app = TestApp::new();
    let user = actor(Role::User);
    let product = app.product(1_000, 1).await;

    let response = app
        .cart_router()
        .oneshot(request(
            "POST",
            "/",
            Some(&user),
            Some(json!({ "product_id": product.id, "quantity": 2 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.carts.find_by_user(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sweep_rejects_out_of_range_hours() {
    let app = TestApp::new();
    let admin = actor(Role::Admin);
    seed_abandonable_cart(&app, 30).await;

    let response = app
        .admin_router()
        .oneshot(request(
            "POST",
            "/mark-abandoned",
            Some(&admin),
            Some(json!({ "hours": 1_000_000_000_000_i64 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    assert!(app.carts.list_abandoned().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sweep_body_errors_use_error_envelope() {
    let app = TestApp::new();
    let admin = actor(Role::Admin);

    let response = app
        .admin_router()
        .oneshot(request(
            "POST",
            "/mark-abandoned",
            Some(&admin),
            Some(json!({ "hourz": 5 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "JSON_EXTRACTION");
    assert!(body["message"].as_str().unwrap().contains("hourz"));

    let malformed = Request::builder()
        .method("POST")
        .uri("/mark-abandoned")
        .extension(admin.clone())
        .header("content-type", "application/json")
        .body(Body::from("{\"hours\": "))
        .unwrap();
    let response = app.admin_router().oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 1003);
}
