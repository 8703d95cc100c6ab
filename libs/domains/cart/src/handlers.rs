//! HTTP handlers for the cart and the admin abandoned-cart endpoints

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    Actor, AdminActor, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CartResult;
use crate::models::{
    AbandonedCart, AbandonedCartStats, AddToCart, Cart, CartLineItem, CheckoutDraft,
    CheckoutRequest, CheckoutResponse, Customer, MarkAbandonedRequest, MarkAbandonedResponse,
    OrderItem, RecoveryResponse, ShippingAddress, UpdateCartItem,
};
use crate::repository::CartRepository;
use crate::service::{AbandonmentService, CartService};

/// OpenAPI documentation for the Cart API
#[derive(OpenApi)]
#[openapi(
    paths(
        get_cart,
        add_item,
        clear_cart,
        update_item,
        remove_item,
        checkout,
        mark_abandoned,
        list_abandoned,
        abandoned_stats,
        recover_cart,
    ),
    components(
        schemas(
            Cart, CartLineItem, AddToCart, UpdateCartItem, CheckoutRequest, ShippingAddress,
            CheckoutDraft, OrderItem, CheckoutResponse, MarkAbandonedRequest,
            MarkAbandonedResponse, AbandonedCart, Customer, RecoveryResponse, AbandonedCartStats
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Cart", description = "Shopping cart and checkout"),
        (name = "Abandoned Carts", description = "Abandoned cart recovery (admin)")
    )
)]
pub struct ApiDoc;

/// Create the cart router, mounted at `/cart`
pub fn router<R: CartRepository + 'static>(service: CartService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(get_cart).post(add_item).delete(clear_cart))
        .route("/checkout", post(checkout))
        .route("/{item_id}", put(update_item).delete(remove_item))
        .with_state(shared_service)
}

/// Create the abandoned cart router, mounted at `/admin/carts`
pub fn admin_router<R: CartRepository + 'static>(service: AbandonmentService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/mark-abandoned", post(mark_abandoned))
        .route("/abandoned", get(list_abandoned))
        .route("/abandoned/stats", get(abandoned_stats))
        .route("/{id}/recover", post(recover_cart))
        .with_state(shared_service)
}

/// Get the current user's cart, creating it if needed
#[utoipa::path(
    get,
    path = "",
    context_path = "/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "The user's cart", body = Cart),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_cart<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
) -> CartResult<Json<Cart>> {
    let cart = service.get_cart(actor.id).await?;
    Ok(Json(cart))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "",
    context_path = "/cart",
    tag = "Cart",
    request_body = AddToCart,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_item<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<AddToCart>,
) -> CartResult<Json<Cart>> {
    let cart = service
        .add_item(actor.id, input.product_id, input.quantity.unwrap_or(1))
        .await?;
    Ok(Json(cart))
}

/// Remove every item from the cart
#[utoipa::path(
    delete,
    path = "",
    context_path = "/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Empty cart", body = Cart),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn clear_cart<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
) -> CartResult<Json<Cart>> {
    let cart = service.clear(actor.id).await?;
    Ok(Json(cart))
}

/// Change the quantity of a cart line
#[utoipa::path(
    put,
    path = "/{item_id}",
    context_path = "/cart",
    tag = "Cart",
    params(
        ("item_id" = Uuid, Path, description = "Cart line item ID")
    ),
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_item<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
    UuidPath(item_id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCartItem>,
) -> CartResult<Json<Cart>> {
    let cart = service.update_item(actor.id, item_id, input.quantity).await?;
    Ok(Json(cart))
}

/// Remove a cart line
#[utoipa::path(
    delete,
    path = "/{item_id}",
    context_path = "/cart",
    tag = "Cart",
    params(
        ("item_id" = Uuid, Path, description = "Cart line item ID")
    ),
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_item<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
    UuidPath(item_id): UuidPath,
) -> CartResult<Json<Cart>> {
    let cart = service.remove_item(actor.id, item_id).await?;
    Ok(Json(cart))
}

/// Price the cart for order creation
#[utoipa::path(
    post,
    path = "/checkout",
    context_path = "/cart",
    tag = "Cart",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order draft and the cart it was priced from", body = CheckoutResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn checkout<R: CartRepository>(
    State(service): State<Arc<CartService<R>>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<CheckoutRequest>,
) -> CartResult<Json<CheckoutResponse>> {
    let response = service.checkout(actor.id, input).await?;
    Ok(Json(response))
}

/// Flag carts idle for longer than `hours` as abandoned
#[utoipa::path(
    post,
    path = "/mark-abandoned",
    context_path = "/admin/carts",
    tag = "Abandoned Carts",
    request_body(content = MarkAbandonedRequest, description = "Optional threshold"),
    responses(
        (status = 200, description = "Sweep result", body = MarkAbandonedResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_abandoned<R: CartRepository>(
    State(service): State<Arc<AbandonmentService<R>>>,
    _admin: AdminActor,
    input: Option<ValidatedJson<MarkAbandonedRequest>>,
) -> CartResult<Json<MarkAbandonedResponse>> {
    let hours = input.and_then(|ValidatedJson(body)| body.hours);
    let response = service.mark_abandoned(hours).await?;
    Ok(Json(response))
}

/// List abandoned carts with their owners
#[utoipa::path(
    get,
    path = "/abandoned",
    context_path = "/admin/carts",
    tag = "Abandoned Carts",
    responses(
        (status = 200, description = "Abandoned carts, most recent first", body = Vec<AbandonedCart>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_abandoned<R: CartRepository>(
    State(service): State<Arc<AbandonmentService<R>>>,
    _admin: AdminActor,
) -> CartResult<Json<Vec<AbandonedCart>>> {
    let carts = service.abandoned().await?;
    Ok(Json(carts))
}

/// Abandoned cart counts and value
#[utoipa::path(
    get,
    path = "/abandoned/stats",
    context_path = "/admin/carts",
    tag = "Abandoned Carts",
    responses(
        (status = 200, description = "Abandoned cart statistics", body = AbandonedCartStats),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn abandoned_stats<R: CartRepository>(
    State(service): State<Arc<AbandonmentService<R>>>,
    _admin: AdminActor,
) -> CartResult<Json<AbandonedCartStats>> {
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Recover an abandoned cart and email its owner
#[utoipa::path(
    post,
    path = "/{id}/recover",
    context_path = "/admin/carts",
    tag = "Abandoned Carts",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart recovered", body = RecoveryResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn recover_cart<R: CartRepository>(
    State(service): State<Arc<AbandonmentService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> CartResult<Json<RecoveryResponse>> {
    let response = service.recover(id).await?;
    Ok(Json(response))
}
