//! MongoDB implementations of the support repositories

use async_trait::async_trait;
use axum_helpers::PageQuery;
use database::mongodb::{find_page, is_duplicate_key, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{SupportError, SupportResult};
use crate::models::{Contact, ContactStatus, Subscriber, Warranty, WarrantyStatus};
use crate::repository::{ContactRepository, SubscriberRepository, WarrantyRepository};

fn index(keys: Document, name: &str, unique: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(unique)
                .name(name.to_string())
                .build(),
        )
        .build()
}

fn status_filter(status: Option<String>) -> Document {
    match status {
        Some(status) => doc! { "status": status },
        None => Document::new(),
    }
}

/// MongoDB implementation of the ContactRepository
#[derive(Clone)]
pub struct MongoContactRepository {
    collection: Collection<Contact>,
}

impl MongoContactRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Contact>("contacts");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> SupportResult<()> {
        let indexes = vec![index(
            doc! { "status": 1, "created_at": -1 },
            "idx_status_created",
            false,
        )];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Contact indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    #[instrument(skip(self, contact), fields(contact_id = %contact.id))]
    async fn create(&self, contact: Contact) -> SupportResult<Contact> {
        self.collection.insert_one(&contact).await?;
        tracing::info!(contact_id = %contact.id, "Contact message stored");
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Contact>> {
        let contact = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Contact>, u64)> {
        let (contacts, total) = find_page(
            &self.collection,
            status_filter(status.map(|s| s.to_string())),
            doc! { "created_at": -1 },
            page.skip(),
            page.limit as i64,
        )
        .await?;
        Ok((contacts, total))
    }

    #[instrument(skip(self, contact), fields(contact_id = %contact.id))]
    async fn update(&self, contact: Contact) -> SupportResult<Contact> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(contact.id) }, &contact)
            .await?;

        if result.matched_count == 0 {
            return Err(SupportError::ContactNotFound);
        }
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB implementation of the SubscriberRepository
#[derive(Clone)]
pub struct MongoSubscriberRepository {
    collection: Collection<Subscriber>,
}

impl MongoSubscriberRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Subscriber>("newsletters");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> SupportResult<()> {
        let indexes = vec![
            index(doc! { "email": 1 }, "idx_email_unique", true),
            index(doc! { "unsubscribe_token": 1 }, "idx_token_unique", true),
            index(doc! { "is_subscribed": 1 }, "idx_subscribed", false),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Newsletter indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl SubscriberRepository for MongoSubscriberRepository {
    #[instrument(skip(self, subscriber), fields(subscriber_id = %subscriber.id))]
    async fn create(&self, subscriber: Subscriber) -> SupportResult<Subscriber> {
        self.collection.insert_one(&subscriber).await.map_err(|e| {
            if is_duplicate_key(&e) {
                SupportError::DuplicateSubscriber
            } else {
                e.into()
            }
        })?;
        tracing::info!(subscriber_id = %subscriber.id, "Subscriber created");
        Ok(subscriber)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> SupportResult<Option<Subscriber>> {
        let subscriber = self.collection.find_one(doc! { "email": email }).await?;
        Ok(subscriber)
    }

    #[instrument(skip(self, token))]
    async fn get_by_token(&self, token: &str) -> SupportResult<Option<Subscriber>> {
        let subscriber = self
            .collection
            .find_one(doc! { "unsubscribe_token": token })
            .await?;
        Ok(subscriber)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> SupportResult<Vec<Subscriber>> {
        let cursor = self
            .collection
            .find(Document::new())
            .sort(doc! { "created_at": -1 })
            .await?;
        let subscribers: Vec<Subscriber> = cursor.try_collect().await?;
        Ok(subscribers)
    }

    #[instrument(skip(self))]
    async fn active_emails(&self) -> SupportResult<Vec<String>> {
        let cursor = self
            .collection
            .find(doc! { "is_subscribed": true })
            .sort(doc! { "email": 1 })
            .await?;
        let subscribers: Vec<Subscriber> = cursor.try_collect().await?;
        Ok(subscribers.into_iter().map(|s| s.email).collect())
    }

    #[instrument(skip(self, subscriber), fields(subscriber_id = %subscriber.id))]
    async fn update(&self, subscriber: Subscriber) -> SupportResult<Subscriber> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(subscriber.id) }, &subscriber)
            .await?;

        if result.matched_count == 0 {
            return Err(SupportError::SubscriberNotFound);
        }
        Ok(subscriber)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB implementation of the WarrantyRepository
#[derive(Clone)]
pub struct MongoWarrantyRepository {
    collection: Collection<Warranty>,
}

impl MongoWarrantyRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Warranty>("warranties");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> SupportResult<()> {
        let indexes = vec![
            index(doc! { "serial_number": 1 }, "idx_serial_unique", true),
            index(doc! { "user_id": 1, "created_at": -1 }, "idx_user_created", false),
            index(doc! { "status": 1, "created_at": -1 }, "idx_status_created", false),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Warranty indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl WarrantyRepository for MongoWarrantyRepository {
    #[instrument(skip(self, warranty), fields(warranty_id = %warranty.id))]
    async fn create(&self, warranty: Warranty) -> SupportResult<Warranty> {
        self.collection.insert_one(&warranty).await.map_err(|e| {
            if is_duplicate_key(&e) {
                SupportError::DuplicateSerial
            } else {
                e.into()
            }
        })?;
        tracing::info!(warranty_id = %warranty.id, "Warranty registered");
        Ok(warranty)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> SupportResult<Option<Warranty>> {
        let warranty = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(warranty)
    }

    #[instrument(skip(self))]
    async fn get_by_serial(&self, serial_number: &str) -> SupportResult<Option<Warranty>> {
        let warranty = self
            .collection
            .find_one(doc! { "serial_number": serial_number })
            .await?;
        Ok(warranty)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> SupportResult<Vec<Warranty>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": uuid_bson(user_id) })
            .sort(doc! { "created_at": -1 })
            .await?;
        let warranties: Vec<Warranty> = cursor.try_collect().await?;
        Ok(warranties)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        status: Option<WarrantyStatus>,
        page: PageQuery,
    ) -> SupportResult<(Vec<Warranty>, u64)> {
        let (warranties, total) = find_page(
            &self.collection,
            status_filter(status.map(|s| s.to_string())),
            doc! { "created_at": -1 },
            page.skip(),
            page.limit as i64,
        )
        .await?;
        Ok((warranties, total))
    }

    #[instrument(skip(self, warranty), fields(warranty_id = %warranty.id))]
    async fn update(&self, warranty: Warranty) -> SupportResult<Warranty> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(warranty.id) }, &warranty)
            .await?;

        if result.matched_count == 0 {
            return Err(SupportError::WarrantyNotFound);
        }

        tracing::info!(warranty_id = %warranty.id, status = %warranty.status, "Warranty updated");
        Ok(warranty)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SupportResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(warranty_id = %id, "Warranty deleted");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_uses_wire_name() {
        let filter = status_filter(Some(WarrantyStatus::Void.to_string()));
        assert_eq!(filter.get_str("status").unwrap(), "void");
        assert!(status_filter(None).is_empty());
    }
}
