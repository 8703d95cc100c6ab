//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, OptionalFromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been deserialized and validated.
///
/// Malformed JSON, unknown fields (with `#[serde(deny_unknown_fields)]`) and rule
/// violations all reject with 400 and a structured [`ErrorResponse`](crate::ErrorResponse).
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// #[serde(deny_unknown_fields)]
/// struct AddToCart {
///     product_id: Uuid,
///     #[validate(range(min = 1))]
///     quantity: i64,
/// }
///
/// async fn add(ValidatedJson(input): ValidatedJson<AddToCart>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

/// `Option<ValidatedJson<T>>` is `None` when the request carries no JSON
/// content type. A JSON body that is present must still parse and validate.
impl<T, S> OptionalFromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let Some(Json(data)) = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?
        else {
            return Ok(None);
        };
        data.validate()?;
        Ok(Some(ValidatedJson(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        #[validate(range(min = 1))]
        quantity: i64,
    }

    async fn handler(ValidatedJson(p): ValidatedJson<Payload>) -> String {
        p.quantity.to_string()
    }

    async fn optional_handler(input: Option<ValidatedJson<Payload>>) -> String {
        input.map_or_else(|| "none".to_string(), |ValidatedJson(p)| p.quantity.to_string())
    }

    async fn send(body: &str) -> StatusCode {
        let app = Router::new().route("/", post(handler));
        app.oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(send(r#"{"quantity": 2}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_bad_request() {
        assert_eq!(send(r#"{"quantity": 0}"#).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        assert_eq!(
            send(r#"{"quantity": 1, "price": 1}"#).await,
            StatusCode::BAD_REQUEST
        );
    }

    async fn send_optional(body: Option<&str>) -> (StatusCode, String) {
        let app = Router::new().route("/", post(optional_handler));
        let request = axum::http::Request::builder().method("POST").uri("/");
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_optional_body_may_be_absent() {
        assert_eq!(send_optional(None).await, (StatusCode::OK, "none".to_string()));
        assert_eq!(
            send_optional(Some(r#"{"quantity": 3}"#)).await,
            (StatusCode::OK, "3".to_string())
        );
    }

    #[tokio::test]
    async fn test_optional_body_rejections_use_error_envelope() {
        let (status, body) = send_optional(Some(r#"{"quantiti": 3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "JSON_EXTRACTION");

        let (status, _) = send_optional(Some(r#"{"quantity": 0}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
