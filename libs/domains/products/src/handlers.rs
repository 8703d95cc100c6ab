//! HTTP handlers for Products API

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    collect_files,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    Actor, AdminActor, AppError, Paginated, UploadRules, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, CreateReview, Gender, Highlight, Movement, Product, ProductFilter, Review,
    ReviewAdded, SearchParams, UpdateProduct, WatchDetails, WatchStyle,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

const MAX_PRODUCT_IMAGES: usize = 5;

/// Multipart body for image uploads
#[derive(ToSchema)]
#[allow(dead_code)]
struct ProductImagesForm {
    /// Up to 5 image files
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        search_products,
        top_products,
        featured_products,
        best_sellers,
        new_arrivals,
        get_product,
        create_product,
        update_product,
        delete_product,
        upload_images,
        add_review,
    ),
    components(
        schemas(
            Product, CreateProduct, UpdateProduct, WatchDetails, Movement, Gender, WatchStyle,
            Review, CreateReview, ReviewAdded, ProductImagesForm
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
        (name = "Products", description = "Watch catalogue, search and reviews")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/top", get(top_products))
        .route("/featured", get(featured_products))
        .route("/best-sellers", get(best_sellers))
        .route("/new-arrivals", get(new_arrivals))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/images", post(upload_images))
        .route("/{id}/reviews", post(add_review))
        .with_state(shared_service)
}

/// List products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Page of products", body = Paginated<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    actor: Option<Actor>,
    Query(filter): Query<ProductFilter>,
) -> ProductResult<Json<Paginated<Product>>> {
    let page = service.list(filter, actor.as_ref()).await?;
    Ok(Json(page))
}

/// Quick search over names, descriptions and tags
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<SearchParams>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.search(params).await?;
    Ok(Json(products))
}

/// The 5 highest rated products
#[utoipa::path(
    get,
    path = "/top",
    tag = "Products",
    responses(
        (status = 200, description = "Top rated products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn top_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.highlights(Highlight::TopRated).await?))
}

#[utoipa::path(
    get,
    path = "/featured",
    tag = "Products",
    responses(
        (status = 200, description = "Featured products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.highlights(Highlight::Featured).await?))
}

#[utoipa::path(
    get,
    path = "/best-sellers",
    tag = "Products",
    responses(
        (status = 200, description = "Best selling products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn best_sellers<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.highlights(Highlight::BestSellers).await?))
}

#[utoipa::path(
    get,
    path = "/new-arrivals",
    tag = "Products",
    responses(
        (status = 200, description = "New arrivals, newest first", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn new_arrivals<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.highlights(Highlight::NewArrivals).await?))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    let product = service.get(id, actor.as_ref()).await?;
    Ok(Json(product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product and its images
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the product's images
#[utoipa::path(
    post,
    path = "/{id}/images",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = ProductImagesForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product with its new images", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_images<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Product>, AppError> {
    let files = collect_files(multipart, UploadRules::images("images", MAX_PRODUCT_IMAGES)).await?;
    let product = service.upload_images(id, files).await?;
    Ok(Json(product))
}

/// Review a product
#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review added", body = ReviewAdded),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    actor: Actor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> ProductResult<impl IntoResponse> {
    let added = service.add_review(id, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(added)))
}
