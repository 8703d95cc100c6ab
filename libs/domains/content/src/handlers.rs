//! HTTP handlers for the Blogs, Testimonials and FAQs APIs

use axum::{
    extract::{Multipart, Path, Query, State},
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
    Actor, AdminActor, AppError, Paginated, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ContentResult;
use crate::models::{
    Blog, BlogFilter, Comment, CreateBlog, CreateComment, CreateFaq, CreateTestimonial, Faq,
    FaqCategory, Testimonial, UpdateBlog, UpdateFaq, UpdateTestimonial,
};
use crate::repository::{BlogRepository, FaqRepository, TestimonialRepository};
use crate::service::{BlogService, FaqService, TestimonialService};

/// Multipart body carrying one image
#[derive(ToSchema)]
#[allow(dead_code)]
struct ImageForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// OpenAPI documentation for the content APIs
#[derive(OpenApi)]
#[openapi(
    paths(
        list_blogs,
        get_blog,
        create_blog,
        update_blog,
        delete_blog,
        list_comments,
        add_comment,
        upload_blog_image,
        list_testimonials,
        featured_testimonials,
        get_testimonial,
        create_testimonial,
        update_testimonial,
        delete_testimonial,
        upload_testimonial_image,
        list_faqs,
        faqs_by_category,
        get_faq,
        create_faq,
        update_faq,
        delete_faq,
    ),
    components(
        schemas(
            Blog, Comment, CreateBlog, UpdateBlog, CreateComment, Testimonial,
            CreateTestimonial, UpdateTestimonial, Faq, FaqCategory, CreateFaq, UpdateFaq,
            ImageForm
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
        (name = "Blogs", description = "Journal posts and reader comments"),
        (name = "Testimonials", description = "Customer testimonials"),
        (name = "FAQs", description = "Frequently asked questions")
    )
)]
pub struct ApiDoc;

/// Router for `/blogs`
pub fn blogs_router<R: BlogRepository + 'static>(service: BlogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route(
            "/{id}",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .route("/{id}/comments", get(list_comments).post(add_comment))
        .route("/{id}/image", post(upload_blog_image))
        .with_state(shared_service)
}

/// Router for `/testimonials`
pub fn testimonials_router<R: TestimonialRepository + 'static>(
    service: TestimonialService<R>,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_testimonials).post(create_testimonial))
        .route("/featured", get(featured_testimonials))
        .route(
            "/{id}",
            get(get_testimonial)
                .put(update_testimonial)
                .delete(delete_testimonial),
        )
        .route("/{id}/image", post(upload_testimonial_image))
        .with_state(shared_service)
}

/// Router for `/faqs`
pub fn faqs_router<R: FaqRepository + 'static>(service: FaqService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_faqs).post(create_faq))
        .route("/category/{category}", get(faqs_by_category))
        .route("/{id}", get(get_faq).put(update_faq).delete(delete_faq))
        .with_state(shared_service)
}

/// Newest posts first; drafts are listed for admins only
#[utoipa::path(
    get,
    path = "",
    context_path = "/blogs",
    tag = "Blogs",
    params(BlogFilter),
    responses(
        (status = 200, description = "Page of blog posts", body = Paginated<Blog>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    actor: Option<Actor>,
    Query(filter): Query<BlogFilter>,
) -> ContentResult<Json<Paginated<Blog>>> {
    Ok(Json(service.list(filter, actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 200, description = "Blog post found", body = Blog),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Blog>> {
    Ok(Json(service.get(id, actor.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/blogs",
    tag = "Blogs",
    request_body = CreateBlog,
    responses(
        (status = 201, description = "Blog post created", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateBlog>,
) -> ContentResult<impl IntoResponse> {
    let blog = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    request_body = UpdateBlog,
    responses(
        (status = 200, description = "Blog post updated", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBlog>,
) -> ContentResult<Json<Blog>> {
    Ok(Json(service.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 204, description = "Blog post deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/comments",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 200, description = "Comments in posting order", body = Vec<Comment>),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_comments<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Vec<Comment>>> {
    Ok(Json(service.comments(id, actor.as_ref()).await?))
}

/// Comment on a published post; signed-in readers may omit name and email
#[utoipa::path(
    post,
    path = "/{id}/comments",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_comment<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> ContentResult<impl IntoResponse> {
    let comment = service.add_comment(id, actor.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    post,
    path = "/{id}/image",
    context_path = "/blogs",
    tag = "Blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Blog post with its new featured image", body = Blog),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn upload_blog_image<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Blog>, AppError> {
    let file = collect_single_file(multipart, "image").await?;
    Ok(Json(service.upload_featured_image(id, file).await?))
}

/// Approved and active testimonials; admins see all
#[utoipa::path(
    get,
    path = "",
    context_path = "/testimonials",
    tag = "Testimonials",
    responses(
        (status = 200, description = "Testimonials, newest first", body = Vec<Testimonial>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_testimonials<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    actor: Option<Actor>,
) -> ContentResult<Json<Vec<Testimonial>>> {
    Ok(Json(service.list(actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/featured",
    context_path = "/testimonials",
    tag = "Testimonials",
    responses(
        (status = 200, description = "Up to six featured testimonials", body = Vec<Testimonial>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured_testimonials<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
) -> ContentResult<Json<Vec<Testimonial>>> {
    Ok(Json(service.featured().await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/testimonials",
    tag = "Testimonials",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    responses(
        (status = 200, description = "Testimonial found", body = Testimonial),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_testimonial<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Testimonial>> {
    Ok(Json(service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/testimonials",
    tag = "Testimonials",
    request_body = CreateTestimonial,
    responses(
        (status = 201, description = "Testimonial created", body = Testimonial),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_testimonial<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateTestimonial>,
) -> ContentResult<impl IntoResponse> {
    let testimonial = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/testimonials",
    tag = "Testimonials",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    request_body = UpdateTestimonial,
    responses(
        (status = 200, description = "Testimonial updated", body = Testimonial),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_testimonial<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateTestimonial>,
) -> ContentResult<Json<Testimonial>> {
    Ok(Json(service.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/testimonials",
    tag = "Testimonials",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    responses(
        (status = 204, description = "Testimonial deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_testimonial<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/image",
    context_path = "/testimonials",
    tag = "Testimonials",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Testimonial with its new image", body = Testimonial),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn upload_testimonial_image<R: TestimonialRepository>(
    State(service): State<Arc<TestimonialService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Testimonial>, AppError> {
    let file = collect_single_file(multipart, "image").await?;
    Ok(Json(service.upload_image(id, file).await?))
}

#[utoipa::path(
    get,
    path = "",
    context_path = "/faqs",
    tag = "FAQs",
    responses(
        (status = 200, description = "FAQs by category, then order", body = Vec<Faq>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_faqs<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    actor: Option<Actor>,
) -> ContentResult<Json<Vec<Faq>>> {
    Ok(Json(service.list(actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/category/{category}",
    context_path = "/faqs",
    tag = "FAQs",
    params(
        ("category" = FaqCategory, Path, description = "FAQ category")
    ),
    responses(
        (status = 200, description = "FAQs in the category", body = Vec<Faq>),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn faqs_by_category<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    actor: Option<Actor>,
    Path(category): Path<String>,
) -> ContentResult<Json<Vec<Faq>>> {
    Ok(Json(service.by_category(&category, actor.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/faqs",
    tag = "FAQs",
    params(
        ("id" = Uuid, Path, description = "FAQ ID")
    ),
    responses(
        (status = 200, description = "FAQ found", body = Faq),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_faq<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    actor: Option<Actor>,
    UuidPath(id): UuidPath,
) -> ContentResult<Json<Faq>> {
    Ok(Json(service.get(id, actor.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/faqs",
    tag = "FAQs",
    request_body = CreateFaq,
    responses(
        (status = 201, description = "FAQ created", body = Faq),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_faq<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<CreateFaq>,
) -> ContentResult<impl IntoResponse> {
    let faq = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/faqs",
    tag = "FAQs",
    params(
        ("id" = Uuid, Path, description = "FAQ ID")
    ),
    request_body = UpdateFaq,
    responses(
        (status = 200, description = "FAQ updated", body = Faq),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_faq<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateFaq>,
) -> ContentResult<Json<Faq>> {
    Ok(Json(service.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/faqs",
    tag = "FAQs",
    params(
        ("id" = Uuid, Path, description = "FAQ ID")
    ),
    responses(
        (status = 204, description = "FAQ deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_faq<R: FaqRepository>(
    State(service): State<Arc<FaqService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> ContentResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
