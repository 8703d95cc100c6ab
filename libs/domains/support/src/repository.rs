use async_trait::async_trait;
use axum_helpers::PageQuery;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{SupportError, SupportResult};
use crate::models::{Contact, ContactStatus, Subscriber, Warranty, WarrantyStatus};

/// Repository trait for contact form submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: Contact) -> SupportResult<Contact>;

    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Contact>>;

    /// Newest first, plus the total match count
    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Contact>, u64)>;

    async fn update(&self, contact: Contact) -> SupportResult<Contact>;

    async fn delete(&self, id: Uuid) -> SupportResult<bool>;
}

/// Repository trait for newsletter subscribers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Fails with [`SupportError::DuplicateSubscriber`] when the email is taken
    async fn create(&self, subscriber: Subscriber) -> SupportResult<Subscriber>;

    async fn get_by_email(&self, email: &str) -> SupportResult<Option<Subscriber>>;

    async fn get_by_token(&self, token: &str) -> SupportResult<Option<Subscriber>>;

    /// Every subscriber, newest first
    async fn list(&self) -> SupportResult<Vec<Subscriber>>;

    /// Addresses of everyone currently subscribed
    async fn active_emails(&self) -> SupportResult<Vec<String>>;

    async fn update(&self, subscriber: Subscriber) -> SupportResult<Subscriber>;

    async fn delete(&self, id: Uuid) -> SupportResult<bool>;
}

/// Repository trait for product warranties
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WarrantyRepository: Send + Sync {
    /// Fails with [`SupportError::DuplicateSerial`] when the serial number is taken
    async fn create(&self, warranty: Warranty) -> SupportResult<Warranty>;

    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Warranty>>;

    async fn get_by_serial(&self, serial_number: &str) -> SupportResult<Option<Warranty>>;

    /// Warranties registered by one user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> SupportResult<Vec<Warranty>>;

    /// Newest first, plus the total match count
    async fn list(
        &self,
        status: Option<WarrantyStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Warranty>, u64)>;

    async fn update(&self, warranty: Warranty) -> SupportResult<Warranty>;

    async fn delete(&self, id: Uuid) -> SupportResult<bool>;
}

/// Product lookup used when registering a warranty
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WarrantyCatalog: Send + Sync {
    /// Warranty period of a product in months, `None` when the product does not exist
    async fn warranty_months(&self, product_id: Uuid) -> SupportResult<Option<u32>>;
}

fn newest_page<T, K>(mut items: Vec<T>, key: K, page: PageQuery) -> (Vec<T>, u64)
where
    K: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.skip() as usize)
        .take(page.limit as usize)
        .collect();
    (items, total)
}

/// In-memory implementation of ContactRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactRepository {
    contacts: Arc<RwLock<HashMap<Uuid, Contact>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, contact: Contact) -> SupportResult<Contact> {
        self.contacts.write().await.insert(contact.id, contact.clone());
        tracing::info!(contact_id = %contact.id, "Created contact message");
        Ok(contact)
    }

    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Contact>> {
        Ok(self.contacts.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Contact>, u64)> {
        let matching: Vec<Contact> = self
            .contacts
            .read()
            .await
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        Ok(newest_page(matching, |c| c.created_at, page))
    }

    async fn update(&self, contact: Contact) -> SupportResult<Contact> {
        let mut contacts = self.contacts.write().await;
        if !contacts.contains_key(&contact.id) {
            return Err(SupportError::ContactNotFound);
        }
        contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        Ok(self.contacts.write().await.remove(&id).is_some())
    }
}

/// In-memory implementation of SubscriberRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemorySubscriberRepository {
    subscribers: Arc<RwLock<HashMap<Uuid, Subscriber>>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn create(&self, subscriber: Subscriber) -> SupportResult<Subscriber> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.values().any(|s| s.email == subscriber.email) {
            return Err(SupportError::DuplicateSubscriber);
        }
        subscribers.insert(subscriber.id, subscriber.clone());
        tracing::info!(subscriber_id = %subscriber.id, "Created subscriber");
        Ok(subscriber)
    }

    async fn get_by_email(&self, email: &str) -> SupportResult<Option<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.values().find(|s| s.email == email).cloned())
    }

    async fn get_by_token(&self, token: &str) -> SupportResult<Option<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers
            .values()
            .find(|s| s.unsubscribe_token == token)
            .cloned())
    }

    async fn list(&self) -> SupportResult<Vec<Subscriber>> {
        let mut all: Vec<Subscriber> = self.subscribers.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn active_emails(&self) -> SupportResult<Vec<String>> {
        let subscribers = self.subscribers.read().await;
        let mut emails: Vec<String> = subscribers
            .values()
            .filter(|s| s.is_subscribed)
            .map(|s| s.email.clone())
            .collect();
        emails.sort();
        Ok(emails)
    }

    async fn update(&self, subscriber: Subscriber) -> SupportResult<Subscriber> {
        let mut subscribers = self.subscribers.write().await;
        if !subscribers.contains_key(&subscriber.id) {
            return Err(SupportError::SubscriberNotFound);
        }
        subscribers.insert(subscriber.id, subscriber.clone());
        Ok(subscriber)
    }

    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        Ok(self.subscribers.write().await.remove(&id).is_some())
    }
}

/// In-memory implementation of WarrantyRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryWarrantyRepository {
    warranties: Arc<RwLock<HashMap<Uuid, Warranty>>>,
}

impl InMemoryWarrantyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WarrantyRepository for InMemoryWarrantyRepository {
    async fn create(&self, warranty: Warranty) -> SupportResult<Warranty> {
        let mut warranties = self.warranties.write().await;
        if warranties
            .values()
            .any(|w| w.serial_number == warranty.serial_number)
        {
            return Err(SupportError::DuplicateSerial);
        }
        warranties.insert(warranty.id, warranty.clone());
        tracing::info!(warranty_id = %warranty.id, "Created warranty");
        Ok(warranty)
    }

    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Warranty>> {
        Ok(self.warranties.read().await.get(&id).cloned())
    }

    async fn get_by_serial(&self, serial_number: &str) -> SupportResult<Option<Warranty>> {
        let warranties = self.warranties.read().await;
        Ok(warranties
            .values()
            .find(|w| w.serial_number == serial_number)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> SupportResult<Vec<Warranty>> {
        let mut mine: Vec<Warranty> = self
            .warranties
            .read()
            .await
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn list(
        &self,
        status: Option<WarrantyStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Warranty>, u64)> {
        let matching: Vec<Warranty> = self
            .warranties
            .read()
            .await
            .values()
            .filter(|w| status.is_none_or(|s| w.status == s))
            .cloned()
            .collect();
        Ok(newest_page(matching, |w| w.created_at, page))
    }

    async fn update(&self, warranty: Warranty) -> SupportResult<Warranty> {
        let mut warranties = self.warranties.write().await;
        if !warranties.contains_key(&warranty.id) {
            return Err(SupportError::WarrantyNotFound);
        }
        warranties.insert(warranty.id, warranty.clone());
        Ok(warranty)
    }

    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        Ok(self.warranties.write().await.remove(&id).is_some())
    }
}

/// In-memory warranty periods keyed by product (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryWarrantyCatalog {
    months: Arc<RwLock<HashMap<Uuid, u32>>>,
}

impl InMemoryWarrantyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product_id: Uuid, months: u32) {
        self.months.write().await.insert(product_id, months);
    }
}

#[async_trait]
impl WarrantyCatalog for InMemoryWarrantyCatalog {
    async fn warranty_months(&self, product_id: Uuid) -> SupportResult<Option<u32>> {
        Ok(self.months.read().await.get(&product_id).copied())
    }
}
