//! HTTP handlers for Users API

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post, put},
};
use axum_helpers::{
    Actor, AdminActor, AppError, Paginated, UuidPath, ValidatedJson, auth_cookie,
    clear_auth_cookie, collect_single_file,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    Address, AddressInput, AdminUpdateUser, AuthResponse, LoginRequest, RegisterRequest,
    SessionUser, UpdateAddress, UpdateProfile, UserFilter, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Multipart body for the profile picture
#[derive(ToSchema)]
#[allow(dead_code)]
struct ProfileImageForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        logout,
        me,
        get_profile,
        update_profile,
        upload_profile_image,
        list_addresses,
        add_address,
        update_address,
        delete_address,
        set_default_address,
        get_wishlist,
        add_to_wishlist,
        remove_from_wishlist,
        list_users,
        get_user,
        update_user,
        delete_user,
    ),
    components(
        schemas(
            UserResponse, SessionUser, AuthResponse, RegisterRequest, LoginRequest,
            UpdateProfile, AdminUpdateUser, Address, AddressInput, UpdateAddress,
            ProfileImageForm
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "Accounts, sessions, addresses and wishlists")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/image", post(upload_profile_image))
        .route("/addresses", get(list_addresses).post(add_address))
        .route(
            "/addresses/{address_id}",
            put(update_address).delete(delete_address),
        )
        .route("/addresses/{address_id}/default", put(set_default_address))
        .route("/wishlist", get(get_wishlist))
        .route(
            "/wishlist/{product_id}",
            post(add_to_wishlist).delete(remove_from_wishlist),
        )
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(shared_service)
}

fn set_cookie(value: String) -> UserResult<AppendHeaders<[(header::HeaderName, HeaderValue); 1]>> {
    let value = HeaderValue::from_str(&value).map_err(|e| UserError::Token(e.to_string()))?;
    Ok(AppendHeaders([(header::SET_COOKIE, value)]))
}

/// Create an account and start a session
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let session = service.register(input).await?;
    let cookie = set_cookie(auth_cookie(
        &session.token,
        service.token_ttl_seconds(),
        service.secure_cookies(),
    ))?;
    Ok((StatusCode::CREATED, cookie, Json(session)))
}

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookie set", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<impl IntoResponse> {
    let session = service.login(input).await?;
    let cookie = set_cookie(auth_cookie(
        &session.token,
        service.token_ttl_seconds(),
        service.secure_cookies(),
    ))?;
    Ok((cookie, Json(session)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Users",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
async fn logout<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<impl IntoResponse> {
    let cookie = set_cookie(clear_auth_cookie(service.secure_cookies()))?;
    Ok((
        cookie,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    ))
}

/// The signed-in user's session identity
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = SessionUser),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn me(actor: Actor) -> Json<SessionUser> {
    Json(SessionUser {
        id: actor.id,
        name: actor.name,
        email: actor.email,
        role: actor.role,
    })
}

/// The signed-in user's full profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.get(actor.id).await?))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Users",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.update_profile(actor.id, input).await?))
}

/// Replace the profile picture
#[utoipa::path(
    post,
    path = "/profile/image",
    tag = "Users",
    request_body(content = ProfileImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile with the new image", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_profile_image<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let file = collect_single_file(multipart, "image").await?;
    let user = service.upload_profile_image(actor.id, file).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/addresses",
    tag = "Users",
    responses(
        (status = 200, description = "Saved addresses", body = Vec<Address>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_addresses<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
) -> UserResult<Json<Vec<Address>>> {
    Ok(Json(service.addresses(actor.id).await?))
}

/// Save a new address; the first one becomes the default
#[utoipa::path(
    post,
    path = "/addresses",
    tag = "Users",
    request_body = AddressInput,
    responses(
        (status = 201, description = "Address saved", body = Vec<Address>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn add_address<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> UserResult<impl IntoResponse> {
    let addresses = service.add_address(actor.id, input).await?;
    Ok((StatusCode::CREATED, Json(addresses)))
}

#[utoipa::path(
    put,
    path = "/addresses/{address_id}",
    tag = "Users",
    params(
        ("address_id" = Uuid, Path, description = "Address ID")
    ),
    request_body = UpdateAddress,
    responses(
        (status = 200, description = "Address updated", body = Vec<Address>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_address<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    UuidPath(address_id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateAddress>,
) -> UserResult<Json<Vec<Address>>> {
    Ok(Json(service.update_address(actor.id, address_id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/addresses/{address_id}",
    tag = "Users",
    params(
        ("address_id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Remaining addresses", body = Vec<Address>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_address<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    UuidPath(address_id): UuidPath,
) -> UserResult<Json<Vec<Address>>> {
    Ok(Json(service.delete_address(actor.id, address_id).await?))
}

#[utoipa::path(
    put,
    path = "/addresses/{address_id}/default",
    tag = "Users",
    params(
        ("address_id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Addresses with the new default", body = Vec<Address>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn set_default_address<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    UuidPath(address_id): UuidPath,
) -> UserResult<Json<Vec<Address>>> {
    Ok(Json(service.set_default_address(actor.id, address_id).await?))
}

#[utoipa::path(
    get,
    path = "/wishlist",
    tag = "Users",
    responses(
        (status = 200, description = "Wishlisted product IDs", body = Vec<Uuid>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn get_wishlist<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
) -> UserResult<Json<Vec<Uuid>>> {
    Ok(Json(service.wishlist(actor.id).await?))
}

#[utoipa::path(
    post,
    path = "/wishlist/{product_id}",
    tag = "Users",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Updated wishlist", body = Vec<Uuid>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn add_to_wishlist<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    UuidPath(product_id): UuidPath,
) -> UserResult<Json<Vec<Uuid>>> {
    Ok(Json(service.add_to_wishlist(actor.id, product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/wishlist/{product_id}",
    tag = "Users",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Updated wishlist", body = Vec<Uuid>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn remove_from_wishlist<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: Actor,
    UuidPath(product_id): UuidPath,
) -> UserResult<Json<Vec<Uuid>>> {
    Ok(Json(service.remove_from_wishlist(actor.id, product_id).await?))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminActor,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<Paginated<UserResponse>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.get(id).await?))
}

/// Change a user's details, role or active flag (admin)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = AdminUpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AdminUpdateUser>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.admin_update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
