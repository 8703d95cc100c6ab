//! Authentication and authorization.
//!
//! - Stateless HS256 JWTs issued at login ([`JwtAuth`])
//! - [`optional_jwt_auth_middleware`] resolves the token into an [`Actor`] once per request
//! - Handlers declare what they need through extractors: [`Actor`], `Option<Actor>` or [`AdminActor`]
//! - [`Visible`] centralises the "admins see everything" rule for public listings
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, optional_jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let api = api.layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//! ```

pub mod actor;
pub mod config;
pub mod cookie;
pub mod jwt;
pub mod middleware;

pub use actor::{Actor, AdminActor, Role, Visible, public_only};
pub use config::JwtConfig;
pub use cookie::{AUTH_COOKIE, auth_cookie, clear_auth_cookie};
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{extract_token_from_request, optional_jwt_auth_middleware};
