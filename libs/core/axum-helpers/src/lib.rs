//! # Axum Helpers
//!
//! Shared HTTP plumbing for the shop API crates.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT issuing/verification, the [`Actor`] principal and its extractors
//! - **[`server`]**: Router assembly with OpenAPI UIs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: [`AppError`] and the structured [`ErrorResponse`] body
//! - **[`extractors`]**: UUID paths, validated JSON, multipart uploads
//! - **[`pagination`]**: the `{count, pagination, total, data}` list envelope
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes).await?;
//! let app = router.merge(health_router(app_info!()));
//! create_production_app(app, &ServerConfig::default(), Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use auth::{
    Actor, AdminActor, JwtAuth, JwtClaims, JwtConfig, Role, Visible, auth_cookie,
    clear_auth_cookie, optional_jwt_auth_middleware, public_only,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{
    UploadRules, UploadedFile, UuidPath, UuidPathPair, ValidatedJson, collect_files,
    collect_single_file,
};

pub use pagination::{PageQuery, Paginated};
