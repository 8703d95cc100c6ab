//! HTTP handlers for the Contact, Newsletter and Warranty APIs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_helpers::{
    collect_files,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    Actor, AdminActor, AppError, Paginated, UploadRules, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::SupportResult;
use crate::models::{
    Contact, ContactFilter, ContactStatus, ContactSubmitted, CreateContact, MessageResponse,
    NewsletterSent, RegisterWarranty, SendNewsletter, Subscribe, Subscriber, Subscription,
    SubscriptionResponse, UpdateContactStatus, UpdateWarranty, Warranty, WarrantyFilter,
    WarrantyStatus, MAX_WARRANTY_DOCUMENTS,
};
use crate::repository::{ContactRepository, SubscriberRepository, WarrantyRepository};
use crate::service::{ContactService, NewsletterService, WarrantyService};

/// Multipart body carrying warranty paperwork
#[derive(ToSchema)]
#[allow(dead_code)]
struct DocumentsForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    documents: Vec<Vec<u8>>,
}

/// OpenAPI documentation for the support APIs
#[derive(OpenApi)]
#[openapi(
    paths(
        submit_contact,
        list_contacts,
        get_contact,
        update_contact_status,
        delete_contact,
        subscribe,
        unsubscribe,
        list_subscribers,
        delete_subscriber,
        send_newsletter,
        register_warranty,
        my_warranties,
        get_warranty,
        upload_warranty_documents,
        list_warranties,
        update_warranty,
        delete_warranty,
    ),
    components(
        schemas(
            Contact, ContactStatus, CreateContact, UpdateContactStatus, ContactSubmitted,
            Subscriber, Subscribe, SubscriptionResponse, SendNewsletter, NewsletterSent,
            MessageResponse, Warranty, WarrantyStatus, RegisterWarranty, UpdateWarranty,
            DocumentsForm
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
        (name = "Contact", description = "Contact form and admin inbox"),
        (name = "Newsletter", description = "Newsletter subscriptions and mailings"),
        (name = "Warranty", description = "Warranty registration and claims")
    )
)]
pub struct ApiDoc;

/// Router for `/contact`
pub fn contact_router<R: ContactRepository + 'static>(service: ContactService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_contacts).post(submit_contact))
        .route("/{id}", get(get_contact).delete(delete_contact))
        .route("/{id}/status", put(update_contact_status))
        .with_state(shared_service)
}

/// Router for `/newsletter`
pub fn newsletter_router<R: SubscriberRepository + 'static>(
    service: NewsletterService<R>,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_subscribers))
        .route("/subscribe", post(subscribe))
        .route("/unsubscribe/{token}", get(unsubscribe))
        .route("/send", post(send_newsletter))
        .route("/{id}", delete(delete_subscriber))
        .with_state(shared_service)
}

/// Router for `/warranty`
pub fn warranty_router<R: WarrantyRepository + 'static>(service: WarrantyService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_warranties).post(register_warranty))
        .route("/mine", get(my_warranties))
        .route(
            "/{id}",
            get(get_warranty)
                .put(update_warranty)
                .delete(delete_warranty),
        )
        .route("/{id}/documents", post(upload_warranty_documents))
        .with_state(shared_service)
}

/// Send a message to the shop
#[utoipa::path(
    post,
    path = "",
    context_path = "/contact",
    tag = "Contact",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Message received", body = ContactSubmitted),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn submit_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateContact>,
) -> SupportResult<impl IntoResponse> {
    let contact = service.submit(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContactSubmitted {
            message: "Your message has been sent successfully".to_string(),
            contact,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "",
    context_path = "/contact",
    tag = "Contact",
    params(ContactFilter),
    responses(
        (status = 200, description = "Page of contact messages, newest first", body = Paginated<Contact>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_contacts<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    _admin: AdminActor,
    Query(filter): Query<ContactFilter>,
) -> SupportResult<Json<Paginated<Contact>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/contact",
    tag = "Contact",
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    responses(
        (status = 200, description = "Contact message found", body = Contact),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> SupportResult<Json<Contact>> {
    Ok(Json(service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    context_path = "/contact",
    tag = "Contact",
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    request_body = UpdateContactStatus,
    responses(
        (status = 200, description = "Status updated", body = Contact),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_contact_status<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateContactStatus>,
) -> SupportResult<Json<Contact>> {
    Ok(Json(service.update_status(id, input.status).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/contact",
    tag = "Contact",
    params(
        ("id" = Uuid, Path, description = "Contact message ID")
    ),
    responses(
        (status = 204, description = "Contact message deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> SupportResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subscribe an email address; 201 for new subscribers, 200 otherwise
#[utoipa::path(
    post,
    path = "/subscribe",
    context_path = "/newsletter",
    tag = "Newsletter",
    request_body = Subscribe,
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 200, description = "Already subscribed or resubscribed", body = SubscriptionResponse),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn subscribe<R: SubscriberRepository>(
    State(service): State<Arc<NewsletterService<R>>>,
    ValidatedJson(input): ValidatedJson<Subscribe>,
) -> SupportResult<impl IntoResponse> {
    let subscription = service.subscribe(input).await?;
    let status = match subscription {
        Subscription::Created(_) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(SubscriptionResponse::from(&subscription))))
}

#[utoipa::path(
    get,
    path = "/unsubscribe/{token}",
    context_path = "/newsletter",
    tag = "Newsletter",
    params(
        ("token" = String, Path, description = "Unsubscribe token from the welcome email")
    ),
    responses(
        (status = 200, description = "Unsubscribed", body = MessageResponse),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn unsubscribe<R: SubscriberRepository>(
    State(service): State<Arc<NewsletterService<R>>>,
    Path(token): Path<String>,
) -> SupportResult<Json<MessageResponse>> {
    service.unsubscribe(&token).await?;
    Ok(Json(MessageResponse {
        message: "Successfully unsubscribed from newsletter".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "",
    context_path = "/newsletter",
    tag = "Newsletter",
    responses(
        (status = 200, description = "Subscribers, newest first", body = Vec<Subscriber>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_subscribers<R: SubscriberRepository>(
    State(service): State<Arc<NewsletterService<R>>>,
    _admin: AdminActor,
) -> SupportResult<Json<Vec<Subscriber>>> {
    Ok(Json(service.list().await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/newsletter",
    tag = "Newsletter",
    params(
        ("id" = Uuid, Path, description = "Subscriber ID")
    ),
    responses(
        (status = 204, description = "Subscriber deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_subscriber<R: SubscriberRepository>(
    State(service): State<Arc<NewsletterService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> SupportResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mail an issue to every active subscriber
#[utoipa::path(
    post,
    path = "/send",
    context_path = "/newsletter",
    tag = "Newsletter",
    request_body = SendNewsletter,
    responses(
        (status = 200, description = "Newsletter sent", body = NewsletterSent),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn send_newsletter<R: SubscriberRepository>(
    State(service): State<Arc<NewsletterService<R>>>,
    _admin: AdminActor,
    ValidatedJson(input): ValidatedJson<SendNewsletter>,
) -> SupportResult<Json<NewsletterSent>> {
    Ok(Json(service.send(input).await?))
}

#[utoipa::path(
    post,
    path = "",
    context_path = "/warranty",
    tag = "Warranty",
    request_body = RegisterWarranty,
    responses(
        (status = 201, description = "Warranty registered, pending review", body = Warranty),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn register_warranty<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<RegisterWarranty>,
) -> SupportResult<impl IntoResponse> {
    let warranty = service.register(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(warranty)))
}

#[utoipa::path(
    get,
    path = "/mine",
    context_path = "/warranty",
    tag = "Warranty",
    responses(
        (status = 200, description = "Warranties registered by the caller", body = Vec<Warranty>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn my_warranties<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    actor: Actor,
) -> SupportResult<Json<Vec<Warranty>>> {
    Ok(Json(service.mine(&actor).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/warranty",
    tag = "Warranty",
    params(
        ("id" = Uuid, Path, description = "Warranty ID")
    ),
    responses(
        (status = 200, description = "Warranty found", body = Warranty),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_warranty<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> SupportResult<Json<Warranty>> {
    Ok(Json(service.get(id, &actor).await?))
}

/// Attach up to three receipts or photos
#[utoipa::path(
    post,
    path = "/{id}/documents",
    context_path = "/warranty",
    tag = "Warranty",
    params(
        ("id" = Uuid, Path, description = "Warranty ID")
    ),
    request_body(content = DocumentsForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Warranty with its documents", body = Warranty),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn upload_warranty_documents<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    actor: Actor,
    UuidPath(id): UuidPath,
    multipart: Multipart,
) -> Result<Json<Warranty>, AppError> {
    let files = collect_files(
        multipart,
        UploadRules::documents("documents", MAX_WARRANTY_DOCUMENTS),
    )
    .await?;
    Ok(Json(service.upload_documents(id, &actor, files).await?))
}

#[utoipa::path(
    get,
    path = "",
    context_path = "/warranty",
    tag = "Warranty",
    params(WarrantyFilter),
    responses(
        (status = 200, description = "Page of warranties, newest first", body = Paginated<Warranty>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_warranties<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    _admin: AdminActor,
    Query(filter): Query<WarrantyFilter>,
) -> SupportResult<Json<Paginated<Warranty>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/warranty",
    tag = "Warranty",
    params(
        ("id" = Uuid, Path, description = "Warranty ID")
    ),
    request_body = UpdateWarranty,
    responses(
        (status = 200, description = "Warranty updated", body = Warranty),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_warranty<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateWarranty>,
) -> SupportResult<Json<Warranty>> {
    Ok(Json(service.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/warranty",
    tag = "Warranty",
    params(
        ("id" = Uuid, Path, description = "Warranty ID")
    ),
    responses(
        (status = 204, description = "Warranty and its documents deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_warranty<R: WarrantyRepository>(
    State(service): State<Arc<WarrantyService<R>>>,
    _admin: AdminActor,
    UuidPath(id): UuidPath,
) -> SupportResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
