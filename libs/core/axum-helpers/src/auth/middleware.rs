use super::actor::Actor;
use super::cookie::AUTH_COOKIE;
use super::jwt::JwtAuth;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Extract a token from `Authorization: Bearer <token>`, falling back to the session cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == AUTH_COOKIE && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

/// Resolve the request's token into an [`Actor`] extension.
///
/// Never rejects: anonymous and invalid-token requests pass through without an actor,
/// and the [`Actor`]/[`AdminActor`](super::AdminActor) extractors decide per route.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(request.headers()) {
        match auth.verify(&token).and_then(|claims| claims.to_actor()) {
            Ok(actor) => {
                tracing::debug!(user_id = %actor.id, role = %actor.role, "Request authenticated");
                request.extensions_mut().insert(actor);
            }
            Err(e) => {
                tracing::debug!("JWT verification failed: {}", e);
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, Role};
    use axum::{Router, body::Body, http::{Request as HttpRequest, StatusCode}, routing::get};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        assert_eq!(extract_token_from_request(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; token=abc.def")]);
        assert_eq!(extract_token_from_request(&map).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_token_ignores_cleared_cookie() {
        let map = headers(&[(header::COOKIE, "token=")]);
        assert!(extract_token_from_request(&map).is_none());
    }

    async fn whoami(actor: Option<Actor>) -> String {
        actor.map(|a| a.role.to_string()).unwrap_or_else(|| "anonymous".into())
    }

    #[tokio::test]
    async fn test_middleware_inserts_actor() {
        let auth = JwtAuth::new(
            &JwtConfig::new("this-is-a-valid-secret-with-32-chars!", 1).unwrap(),
        );
        let token = auth
            .issue(&Actor {
                id: Uuid::now_v7(),
                name: "Root".into(),
                email: "root@example.com".into(),
                role: Role::Admin,
            })
            .unwrap();

        let app = Router::new()
            .route("/", get(whoami))
            .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));

        let response = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
        assert_eq!(&body[..], b"admin");

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("authorization", "Bearer forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
        assert_eq!(&body[..], b"anonymous");
    }
}
