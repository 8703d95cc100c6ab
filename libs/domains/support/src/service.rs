//! Contact, Newsletter and Warranty services

use axum_helpers::{Actor, Paginated, UploadedFile};
use email::Mailer;
use serde::Serialize;
use std::sync::Arc;
use storage::{delete_quietly, folders, SharedStorage};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{SupportError, SupportResult};
use crate::models::{
    normalize_email, Contact, ContactFilter, ContactStatus, CreateContact, NewsletterSent,
    RegisterWarranty, SendNewsletter, Subscribe, Subscriber, Subscription, UpdateWarranty,
    Warranty, WarrantyFilter, MAX_WARRANTY_DOCUMENTS,
};
use crate::repository::{
    ContactRepository, SubscriberRepository, WarrantyCatalog, WarrantyRepository,
};

pub const CONTACT_ADMIN_TEMPLATE: &str = "contact_admin";
pub const CONTACT_ACK_TEMPLATE: &str = "contact_ack";
pub const NEWSLETTER_WELCOME_TEMPLATE: &str = "newsletter_welcome";
pub const NEWSLETTER_ISSUE_TEMPLATE: &str = "newsletter_issue";

fn validation(e: validator::ValidationErrors) -> SupportError {
    SupportError::Validation(e.to_string())
}

#[derive(Serialize)]
struct ContactAdminEmail<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct ContactAckEmail<'a> {
    name: &'a str,
    subject: &'a str,
}

#[derive(Serialize)]
struct WelcomeEmail {
    unsubscribe_url: String,
}

/// Contact form intake and the admin inbox
pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
    mailer: Mailer,
    admin_email: String,
}

impl<R: ContactRepository> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            mailer: self.mailer.clone(),
            admin_email: self.admin_email.clone(),
        }
    }
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: R, mailer: Mailer, admin_email: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            admin_email: admin_email.into(),
        }
    }

    /// Store the message, then notify the shop and acknowledge the sender.
    ///
    /// Email failures are logged; the submission still succeeds.
    #[instrument(skip(self, input), fields(subject = %input.subject))]
    pub async fn submit(&self, input: CreateContact) -> SupportResult<Contact> {
        input.validate().map_err(validation)?;
        let contact = self.repository.create(Contact::new(input)).await?;

        let notification = ContactAdminEmail {
            name: &contact.name,
            email: &contact.email,
            phone: contact.phone.as_deref().unwrap_or("Not provided"),
            subject: &contact.subject,
            message: &contact.message,
        };
        if let Err(e) = self
            .mailer
            .send_template(&self.admin_email, CONTACT_ADMIN_TEMPLATE, &notification)
            .await
        {
            tracing::warn!(contact_id = %contact.id, error = %e, "Failed to notify admin of contact message");
        }

        let ack = ContactAckEmail {
            name: &contact.name,
            subject: &contact.subject,
        };
        if let Err(e) = self
            .mailer
            .send_template(&contact.email, CONTACT_ACK_TEMPLATE, &ack)
            .await
        {
            tracing::warn!(contact_id = %contact.id, error = %e, "Failed to acknowledge contact message");
        }

        Ok(contact)
    }

    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: ContactFilter) -> SupportResult<Paginated<Contact>> {
        let page = filter.page();
        let (contacts, total) = self.repository.list(filter.status, page).await?;
        Ok(Paginated::new(contacts, total, page))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> SupportResult<Contact> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SupportError::ContactNotFound)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, status: ContactStatus) -> SupportResult<Contact> {
        let mut contact = self.get(id).await?;
        contact.status = status;
        contact.updated_at = chrono::Utc::now();
        self.repository.update(contact).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> SupportResult<()> {
        if !self.repository.delete(id).await? {
            return Err(SupportError::ContactNotFound);
        }
        Ok(())
    }
}

/// Newsletter subscriptions and broadcasts
pub struct NewsletterService<R: SubscriberRepository> {
    repository: Arc<R>,
    mailer: Mailer,
    client_url: String,
}

impl<R: SubscriberRepository> Clone for NewsletterService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            mailer: self.mailer.clone(),
            client_url: self.client_url.clone(),
        }
    }
}

impl<R: SubscriberRepository> NewsletterService<R> {
    pub fn new(repository: R, mailer: Mailer, client_url: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            mailer,
            client_url: client_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn unsubscribe_url(&self, token: &str) -> String {
        format!("{}/newsletter/unsubscribe/{}", self.client_url, token)
    }

    /// Subscribe an address, reviving an earlier unsubscription when there is one
    #[instrument(skip(self, input))]
    pub async fn subscribe(&self, input: Subscribe) -> SupportResult<Subscription> {
        input.validate().map_err(validation)?;
        let email = normalize_email(&input.email);

        if let Some(mut existing) = self.repository.get_by_email(&email).await? {
            if existing.is_subscribed {
                return Ok(Subscription::AlreadySubscribed(existing));
            }

            existing.resubscribe();
            let subscriber = self.repository.update(existing).await?;
            tracing::info!(subscriber_id = %subscriber.id, "Subscriber resubscribed");
            return Ok(Subscription::Resubscribed(subscriber));
        }

        let subscriber = self.repository.create(Subscriber::new(&email)).await?;

        let welcome = WelcomeEmail {
            unsubscribe_url: self.unsubscribe_url(&subscriber.unsubscribe_token),
        };
        if let Err(e) = self
            .mailer
            .send_template(&subscriber.email, NEWSLETTER_WELCOME_TEMPLATE, &welcome)
            .await
        {
            tracing::warn!(subscriber_id = %subscriber.id, error = %e, "Failed to send newsletter welcome email");
        }

        Ok(Subscription::Created(subscriber))
    }

    #[instrument(skip(self, token))]
    pub async fn unsubscribe(&self, token: &str) -> SupportResult<Subscriber> {
        let mut subscriber = self
            .repository
            .get_by_token(token)
            .await?
            .ok_or(SupportError::InvalidToken)?;

        if subscriber.is_subscribed {
            subscriber.unsubscribe();
            subscriber = self.repository.update(subscriber).await?;
            tracing::info!(subscriber_id = %subscriber.id, "Subscriber unsubscribed");
        }
        Ok(subscriber)
    }

    pub async fn list(&self) -> SupportResult<Vec<Subscriber>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> SupportResult<()> {
        if !self.repository.delete(id).await? {
            return Err(SupportError::SubscriberNotFound);
        }
        Ok(())
    }

    /// Mail an issue to every active subscriber over BCC
    #[instrument(skip(self, input), fields(subject = %input.subject))]
    pub async fn send(&self, input: SendNewsletter) -> SupportResult<NewsletterSent> {
        input.validate().map_err(validation)?;

        let recipients = self.repository.active_emails().await?;
        if recipients.is_empty() {
            return Err(SupportError::NoActiveSubscribers);
        }

        let sent = self
            .mailer
            .broadcast_template(&recipients, NEWSLETTER_ISSUE_TEMPLATE, &input)
            .await?;

        Ok(NewsletterSent {
            message: format!("Newsletter sent to {} subscribers", sent),
            recipients: sent,
        })
    }
}

/// Warranty registration and claims paperwork
pub struct WarrantyService<R: WarrantyRepository> {
    repository: Arc<R>,
    catalog: Arc<dyn WarrantyCatalog>,
    storage: SharedStorage,
}

impl<R: WarrantyRepository> Clone for WarrantyService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            catalog: Arc::clone(&self.catalog),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: WarrantyRepository> WarrantyService<R> {
    pub fn new(repository: R, catalog: Arc<dyn WarrantyCatalog>, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            catalog,
            storage,
        }
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.id, product_id = %input.product_id))]
    pub async fn register(&self, actor: &Actor, input: RegisterWarranty) -> SupportResult<Warranty> {
        input.validate().map_err(validation)?;

        let months = self
            .catalog
            .warranty_months(input.product_id)
            .await?
            .ok_or(SupportError::ProductNotFound)?;

        if self
            .repository
            .get_by_serial(input.serial_number.trim())
            .await?
            .is_some()
        {
            return Err(SupportError::DuplicateSerial);
        }

        let warranty = Warranty::register(actor.id, input, months)?;
        self.repository.create(warranty).await
    }

    pub async fn mine(&self, actor: &Actor) -> SupportResult<Vec<Warranty>> {
        self.repository.list_for_user(actor.id).await
    }

    async fn load(&self, id: Uuid) -> SupportResult<Warranty> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SupportError::WarrantyNotFound)
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn get(&self, id: Uuid, actor: &Actor) -> SupportResult<Warranty> {
        let warranty = self.load(id).await?;
        if !warranty.accessible_by(actor) {
            return Err(SupportError::NotOwner);
        }
        Ok(warranty)
    }

    /// Attach receipts or photos; a warranty holds at most three documents
    #[instrument(skip(self, actor, files), fields(files = files.len()))]
    pub async fn upload_documents(
        &self,
        id: Uuid,
        actor: &Actor,
        files: Vec<UploadedFile>,
    ) -> SupportResult<Warranty> {
        let mut warranty = self.get(id, actor).await?;
        if files.len() > warranty.remaining_document_slots() {
            return Err(SupportError::TooManyDocuments(MAX_WARRANTY_DOCUMENTS));
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let uploaded = self
                .storage
                .upload(
                    folders::WARRANTY_DOCUMENTS,
                    &file.file_name,
                    &file.content_type,
                    file.bytes.to_vec(),
                )
                .await;
            match uploaded {
                Ok(url) => urls.push(url),
                Err(e) => {
                    delete_quietly(self.storage.as_ref(), &urls).await;
                    return Err(e.into());
                }
            }
        }

        warranty.documents.extend(urls.iter().cloned());
        warranty.updated_at = chrono::Utc::now();

        match self.repository.update(warranty).await {
            Ok(warranty) => Ok(warranty),
            Err(e) => {
                delete_quietly(self.storage.as_ref(), &urls).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: WarrantyFilter) -> SupportResult<Paginated<Warranty>> {
        let page = filter.page();
        let (warranties, total) = self.repository.list(filter.status, page).await?;
        Ok(Paginated::new(warranties, total, page))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateWarranty) -> SupportResult<Warranty> {
        input.validate().map_err(validation)?;

        let mut warranty = self.load(id).await?;
        warranty.apply_update(input);
        self.repository.update(warranty).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> SupportResult<()> {
        let warranty = self.load(id).await?;
        if !self.repository.delete(id).await? {
            return Err(SupportError::WarrantyNotFound);
        }

        delete_quietly(self.storage.as_ref(), &warranty.documents).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        MockContactRepository, MockSubscriberRepository, MockWarrantyCatalog,
        MockWarrantyRepository,
    };
    use axum_helpers::Role;
    use chrono::{Duration, Utc};
    use email::{MockSmtpProvider, TemplateEngine};
    use mockall::predicate::eq;
    use storage::InMemoryStorage;

    fn mailer(provider: &MockSmtpProvider) -> Mailer {
        Mailer::new(Arc::new(provider.clone()), TemplateEngine::new().unwrap())
    }

    fn customer() -> Actor {
        Actor {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::User,
        }
    }

    fn contact_form() -> CreateContact {
        CreateContact {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            phone: None,
            subject: "Strap sizing".to_string(),
            message: "Which length fits a 17cm wrist?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_contact_submit_survives_mail_failure() {
        let mut repo = MockContactRepository::new();
        repo.expect_create().times(1).returning(Ok);

        let provider = MockSmtpProvider::failing("relay down");
        let service = ContactService::new(repo, mailer(&provider), "admin@example.com");

        let contact = service.submit(contact_form()).await.unwrap();
        assert_eq!(contact.status, ContactStatus::New);
    }

    #[tokio::test]
    async fn test_contact_submit_notifies_both_sides() {
        let mut repo = MockContactRepository::new();
        repo.expect_create().returning(Ok);

        let provider = MockSmtpProvider::new();
        let service = ContactService::new(repo, mailer(&provider), "admin@example.com");
        service.submit(contact_form()).await.unwrap();

        assert!(provider.was_sent_to("admin@example.com").await);
        assert!(provider.was_sent_to("kim@example.com").await);
    }

    #[tokio::test]
    async fn test_subscribe_when_already_subscribed_sends_nothing() {
        let existing = Subscriber::new("reader@example.com");
        let mut repo = MockSubscriberRepository::new();
        repo.expect_get_by_email()
            .with(eq("reader@example.com"))
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().never();
        repo.expect_update().never();

        let provider = MockSmtpProvider::new();
        let service = NewsletterService::new(repo, mailer(&provider), "https://shop.example.com/");

        let outcome = service
            .subscribe(Subscribe {
                email: "Reader@Example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, Subscription::AlreadySubscribed(_)));
        assert_eq!(provider.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_send_without_subscribers() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_active_emails().returning(|| Ok(Vec::new()));

        let provider = MockSmtpProvider::new();
        let service = NewsletterService::new(repo, mailer(&provider), "https://shop.example.com");

        let result = service
            .send(SendNewsletter {
                subject: "Spring".to_string(),
                content: "<p>New arrivals</p>".to_string(),
            })
            .await;
        assert!(matches!(result, Err(SupportError::NoActiveSubscribers)));
    }

    #[tokio::test]
    async fn test_register_unknown_product() {
        let mut catalog = MockWarrantyCatalog::new();
        catalog.expect_warranty_months().returning(|_| Ok(None));
        let mut repo = MockWarrantyRepository::new();
        repo.expect_create().never();

        let service = WarrantyService::new(repo, Arc::new(catalog), Arc::new(InMemoryStorage::new()));
        let result = service
            .register(
                &customer(),
                RegisterWarranty {
                    product_id: Uuid::now_v7(),
                    order_ref: "ORD-1".to_string(),
                    serial_number: "SN-1".to_string(),
                    purchase_date: Utc::now() - Duration::days(3),
                },
            )
            .await;
        assert!(matches!(result, Err(SupportError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_stranger_cannot_read_warranty() {
        let owner = customer();
        let warranty = Warranty::register(
            owner.id,
            RegisterWarranty {
                product_id: Uuid::now_v7(),
                order_ref: "ORD-1".to_string(),
                serial_number: "SN-1".to_string(),
                purchase_date: Utc::now() - Duration::days(3),
            },
            24,
        )
        .unwrap();
        let id = warranty.id;

        let mut repo = MockWarrantyRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(warranty.clone())));

        let service = WarrantyService::new(
            repo,
            Arc::new(MockWarrantyCatalog::new()),
            Arc::new(InMemoryStorage::new()),
        );

        assert!(service.get(id, &owner).await.is_ok());
        assert!(matches!(
            service.get(id, &customer()).await,
            Err(SupportError::NotOwner)
        ));
    }
}
