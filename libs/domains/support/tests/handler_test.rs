//! Handler tests for the Contact, Newsletter and Warranty APIs

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_helpers::{Actor, Role};
use domain_support::*;
use email::{Mailer, MockSmtpProvider, TemplateEngine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use storage::InMemoryStorage;
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_INBOX: &str = "shop@example.com";
const CLIENT_URL: &str = "https://tornado.example.com";

struct TestApp {
    contacts: InMemoryContactRepository,
    subscribers: InMemorySubscriberRepository,
    warranties: InMemoryWarrantyRepository,
    catalog: InMemoryWarrantyCatalog,
    storage: InMemoryStorage,
    mail: MockSmtpProvider,
}

impl TestApp {
    fn new() -> Self {
        Self {
            contacts: InMemoryContactRepository::new(),
            subscribers: InMemorySubscriberRepository::new(),
            warranties: InMemoryWarrantyRepository::new(),
            catalog: InMemoryWarrantyCatalog::new(),
            storage: InMemoryStorage::new(),
            mail: MockSmtpProvider::new(),
        }
    }

    fn router(&self) -> Router {
        let mailer = Mailer::new(Arc::new(self.mail.clone()), TemplateEngine::new().unwrap());
        Router::new()
            .nest(
                "/contact",
                handlers::contact_router(ContactService::new(
                    self.contacts.clone(),
                    mailer.clone(),
                    ADMIN_INBOX,
                )),
            )
            .nest(
                "/newsletter",
                handlers::newsletter_router(NewsletterService::new(
                    self.subscribers.clone(),
                    mailer,
                    CLIENT_URL,
                )),
            )
            .nest(
                "/warranty",
                handlers::warranty_router(WarrantyService::new(
                    self.warranties.clone(),
                    Arc::new(self.catalog.clone()),
                    Arc::new(self.storage.clone()),
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

    /// Token from the most recent welcome email
    async fn last_unsubscribe_token(&self) -> String {
        let sent = self.mail.sent_emails().await;
        let text = sent
            .last()
            .and_then(|e| e.body_text.clone())
            .unwrap();
        let (_, tail) = text.split_once("/newsletter/unsubscribe/").unwrap();
        tail.chars().take_while(|c| c.is_ascii_hexdigit()).collect()
    }
}

fn actor(role: Role) -> Actor {
    Actor {
        id: Uuid::now_v7(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

fn admin() -> Actor {
    actor(Role::Admin)
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

fn upload(uri: &str, actor: &Actor, file_names: &[&str]) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let mut body = String::new();
    for name in file_names {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"documents\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n%PDF\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .extension(actor.clone())
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn id_of(value: &Value) -> &str {
    value["_id"].as_str().unwrap()
}

#[tokio::test]
async fn test_contact_submission_flow() {
    let app = TestApp::new();

    let (status, body) = app
        .send(request(
            "POST",
            "/contact",
            None,
            Some(json!({
                "name": "Kim",
                "email": "kim@example.com",
                "subject": "Strap sizing",
                "message": "Which length fits a 17cm wrist?"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Your message has been sent successfully");
    assert_eq!(body["contact"]["status"], "new");
    assert!(app.mail.was_sent_to(ADMIN_INBOX).await);
    assert!(app.mail.was_sent_to("kim@example.com").await);

    let (status, _) = app.send(request("GET", "/contact", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/contact/{}/status", body["contact"]["_id"].as_str().unwrap());
    let (status, updated) = app
        .send(request("PUT", &uri, Some(&admin()), Some(json!({"status": "replied"}))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "replied");

    let (_, page) = app
        .send(request("GET", "/contact?status=new", Some(&admin()), None))
        .await;
    assert_eq!(page["total"], 0);
    let (_, page) = app
        .send(request("GET", "/contact?status=replied", Some(&admin()), None))
        .await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_contact_rejects_bad_email() {
    let app = TestApp::new();
    let (status, _) = app
        .send(request(
            "POST",
            "/contact",
            None,
            Some(json!({"name": "Kim", "email": "nope", "subject": "Hi", "message": "Hello"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.mail.sent_count().await, 0);
}

#[tokio::test]
async fn test_newsletter_subscription_lifecycle() {
    let app = TestApp::new();
    let subscribe = || request("POST", "/newsletter/subscribe", None, Some(json!({"email": "reader@example.com"})));

    let (status, body) = app.send(subscribe()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Successfully subscribed to newsletter");
    assert!(body.get("unsubscribe_token").is_none());

    let token = app.last_unsubscribe_token().await;
    assert_eq!(token.len(), 32);

    let (status, body) = app.send(subscribe()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You are already subscribed to our newsletter");

    let (status, _) = app
        .send(request("GET", &format!("/newsletter/unsubscribe/{token}"), None, None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request("GET", "/newsletter/unsubscribe/deadbeef", None, None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, body) = app.send(subscribe()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have been resubscribed to our newsletter");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(app.mail.sent_count().await, 1);
}

#[tokio::test]
async fn test_newsletter_send() {
    let app = TestApp::new();
    let issue = json!({"subject": "Spring arrivals", "content": "<p>New divers</p>"});

    let (status, body) = app
        .send(request("POST", "/newsletter/send", Some(&admin()), Some(issue.clone())))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No active subscribers found");

    for email in ["a@example.com", "b@example.com"] {
        app.send(request("POST", "/newsletter/subscribe", None, Some(json!({"email": email}))))
            .await;
    }
    app.mail.clear().await;

    let (status, body) = app
        .send(request("POST", "/newsletter/send", Some(&admin()), Some(issue)))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["recipients"], 2);

    let sent = app.mail.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bcc.len(), 2);

    let (status, _) = app
        .send(request(
            "POST",
            "/newsletter/send",
            Some(&admin()),
            Some(json!({"subject": "Missing content"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_warranty_registration() {
    let app = TestApp::new();
    let product_id = Uuid::now_v7();
    app.catalog.insert(product_id, 24).await;
    let owner = actor(Role::User);

    let registration = |product_id: Uuid, serial: &str| {
        json!({
            "product_id": product_id,
            "order_ref": "ORD-1001",
            "serial_number": serial,
            "purchase_date": "2025-03-15T00:00:00Z"
        })
    };

    let (status, body) = app
        .send(request(
            "POST",
            "/warranty",
            Some(&owner),
            Some(registration(Uuid::now_v7(), "SN-1")),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, warranty) = app
        .send(request(
            "POST",
            "/warranty",
            Some(&owner),
            Some(registration(product_id, "SN-1")),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{warranty}");
    assert_eq!(warranty["status"], "pending");
    assert!(warranty["expiry_date"].as_str().unwrap().starts_with("2027-03-15"));

    let (status, body) = app
        .send(request(
            "POST",
            "/warranty",
            Some(&actor(Role::User)),
            Some(registration(product_id, "SN-1")),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Warranty already registered for this serial number");

    let (_, mine) = app
        .send(request("GET", "/warranty/mine", Some(&owner), None))
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let uri = format!("/warranty/{}", id_of(&warranty));
    let (status, _) = app
        .send(request("GET", &uri, Some(&actor(Role::User)), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.send(request("GET", &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = app
        .send(request(
            "PUT",
            &uri,
            Some(&admin()),
            Some(json!({"status": "active", "notes": "Receipt verified"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "active");

    let (_, page) = app
        .send(request("GET", "/warranty?status=active", Some(&admin()), None))
        .await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_warranty_documents_capped_and_cleaned_up() {
    let app = TestApp::new();
    let product_id = Uuid::now_v7();
    app.catalog.insert(product_id, 12).await;
    let owner = actor(Role::User);

    let (_, warranty) = app
        .send(request(
            "POST",
            "/warranty",
            Some(&owner),
            Some(json!({
                "product_id": product_id,
                "order_ref": "ORD-7",
                "serial_number": "SN-7",
                "purchase_date": "2025-06-01T12:00:00Z"
            })),
        ))
        .await;
    let uri = format!("/warranty/{}/documents", id_of(&warranty));

    let (status, body) = app
        .send(upload(&uri, &owner, &["receipt.pdf", "card.pdf"]))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["documents"].as_array().unwrap().len(), 2);
    assert!(body["documents"][0]
        .as_str()
        .unwrap()
        .contains("/warranty-documents/"));

    let (status, body) = app
        .send(upload(&uri, &owner, &["one.pdf", "two.pdf"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A warranty can hold at most 3 documents");

    let (status, _) = app
        .send(upload(&uri, &actor(Role::User), &["other.pdf"]))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.storage.len().await, 2);

    let (status, _) = app
        .send(request(
            "DELETE",
            &format!("/warranty/{}", id_of(&warranty)),
            Some(&admin()),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.storage.is_empty().await);
}
