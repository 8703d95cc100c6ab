//! HTTP handlers for the Categories and Brands APIs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    collect_single_file,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    Actor, AdminActor, AppError, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::CatalogResult;
use crate::models::{
    Brand, Category, CategoryNode, CreateBrand, CreateCategory, UpdateBrand, UpdateCategory,
};
use crate::repository::{BrandRepository, CategoryRepository};
use crate::service::{BrandService, CategoryService};

/// Multipart body carrying one image
#[derive(ToSchema)]
#[allow(dead_code)]
struct ImageForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Multipart body carrying a brand logo
#[derive(ToSchema)]
#[allow(dead_code)]
struct LogoForm {
    #[schema(value_type = String, format = Binary)]
    logo: Vec<u8>,
}

/// OpenAPI documentation for the catalog APIs
#[derive(OpenApi)]
#[openapi(
    paths(
        category_tree,
        list_all_categories,
        get_category,
        create_category,
        update_category,
        delete_category,
        upload_category_image,
        list_brands,
        featured_brands,
        get_brand,
        create_brand,
        update_brand,
        delete_brand,
        upload_brand_logo,
    ),
    components(
        schemas(
            Category, CategoryNode, CreateCategory, UpdateCategory, Brand, CreateBrand,
            UpdateBrand, ImageForm, LogoForm
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
        (name = "Categories", description = "Two-level category tree"),
        (name = "Brands", description = "Watch manufacturers")
    )
)]
pub struct ApiDoc;

/// Router for `/categories`
pub fn categories_router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(category_tree).post(create_category))
        .route("/all", get(list_all_categories))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/{id}/image", post(upload_category_image))
        .with_state(shared_service)
}

/// Router for `/brands`
pub fn brands_router<R: BrandRepository + 'static>(service: BrandService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/featured", get(featured_brands))
        .route(
            "/{id}",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
        .route("/{id}/logo", post(upload_brand_logo))
        .with_state(shared_service)
}

/// Top-level categories with their subcategories
#[utoipa::path(
    get,
    path = "",
    context_path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Category tree", body = Vec<CategoryNode>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn category_tree<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    actor: Option<Actor>,
) -> CatalogResult<Json<Vec<CategoryNode>>> {
    Ok(Json(service.tree(actor.as_ref()).await?))
}

/// Every category as a flat list
#[utoipa::path(
    get,
    path = "/all",
    context_path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    actor: Option<Actor>,
) -> CatalogResult<Json<Vec<Category>>> {
    Ok(Json(service.list_all(actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/categories",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Category>> {
    Ok(Json(service.get(id, actor.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/categories",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/categories",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CatalogResult<Json<Category>> {
    Ok(Json(service.update(id, input).await?))
}

/// Delete a category without subcategories
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/categories",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> CatalogResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/image",
    context_path = "/categories",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Category with its new image", body = Category),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn upload_category_image<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Category>, AppError> {
    let file = collect_single_file(multipart, "image").await?;
    Ok(Json(service.upload_image(id, file).await?))
}

#[utoipa::path(
    get,
    path = "",
    context_path = "/brands",
    tag = "Brands",
    responses(
        (status = 200, description = "Brands sorted by name", body = Vec<Brand>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_brands<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    actor: Option<Actor>,
) -> CatalogResult<Json<Vec<Brand>>> {
    Ok(Json(service.list(actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/featured",
    context_path = "/brands",
    tag = "Brands",
    responses(
        (status = 200, description = "Featured brands", body = Vec<Brand>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured_brands<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
) -> CatalogResult<Json<Vec<Brand>>> {
    Ok(Json(service.featured().await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/brands",
    tag = "Brands",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand found", body = Brand),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Brand>> {
    Ok(Json(service.get(id, actor.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/brands",
    tag = "Brands",
    request_body = CreateBrand,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateBrand>,
) -> CatalogResult<impl IntoResponse> {
    let brand = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/brands",
    tag = "Brands",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = UpdateBrand,
    responses(
        (status = 200, description = "Brand updated", body = Brand),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBrand>,
) -> CatalogResult<Json<Brand>> {
    Ok(Json(service.update(id, input).await?))
}

/// Delete a brand no product references
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/brands",
    tag = "Brands",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> CatalogResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/logo",
    context_path = "/brands",
    tag = "Brands",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body(content = LogoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Brand with its new logo", body = Brand),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn upload_brand_logo<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Brand>, AppError> {
    let file = collect_single_file(multipart, "logo").await?;
    Ok(Json(service.upload_logo(id, file).await?))
}
