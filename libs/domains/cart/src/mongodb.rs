//! MongoDB implementation of CartRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::{is_duplicate_key, serde_helpers::to_bson_date, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{AbandonedTotals, Cart};
use crate::repository::CartRepository;

/// MongoDB implementation of the CartRepository
#[derive(Clone)]
pub struct MongoCartRepository {
    collection: Collection<Cart>,
}

impl MongoCartRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Cart>("carts");
        Self { collection }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> CartResult<()> {
        let indexes = vec![
            // One cart per user
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_user_unique".to_string())
                        .build(),
                )
                .build(),
            // Abandonment sweep
            IndexModel::builder()
                .keys(doc! { "is_abandoned": 1, "last_active": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_abandoned_last_active".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "abandoned_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_abandoned_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Cart indexes created successfully");
        Ok(())
    }

    /// Carts the sweep should flag
    fn abandonment_filter(cutoff: &DateTime<Utc>) -> Document {
        doc! {
            "items.0": { "$exists": true },
            "is_abandoned": false,
            "last_active": { "$lt": to_bson_date(cutoff) },
        }
    }
}

#[async_trait]
impl CartRepository for MongoCartRepository {
    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> CartResult<Option<Cart>> {
        let cart = self
            .collection
            .find_one(doc! { "user_id": uuid_bson(user_id) })
            .await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> CartResult<Option<Cart>> {
        let cart = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn create_for_user(&self, user_id: Uuid) -> CartResult<Cart> {
        let cart = Cart::new(user_id);

        match self.collection.insert_one(&cart).await {
            Ok(_) => {
                tracing::info!(cart_id = %cart.id, user_id = %user_id, "Cart created successfully");
                Ok(cart)
            }
            // Another request created it first
            Err(e) if is_duplicate_key(&e) => self
                .find_by_user(user_id)
                .await?
                .ok_or(CartError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, cart), fields(cart_id = %cart.id, version = cart.version))]
    async fn save(&self, mut cart: Cart) -> CartResult<Cart> {
        let filter = doc! { "_id": uuid_bson(cart.id), "version": cart.version };

        cart.version += 1;
        cart.updated_at = Utc::now();

        let result = self.collection.replace_one(filter, &cart).await?;
        if result.matched_count == 0 {
            tracing::warn!(cart_id = %cart.id, "Cart write lost a concurrent update");
            return Err(CartError::Conflict);
        }

        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn mark_abandoned(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> CartResult<u64> {
        let update = doc! {
            "$set": {
                "is_abandoned": true,
                "abandoned_at": to_bson_date(&now),
                "updated_at": to_bson_date(&now),
            },
            "$inc": { "version": 1 },
        };

        let result = self
            .collection
            .update_many(Self::abandonment_filter(&cutoff), update)
            .await?;

        tracing::info!(modified = result.modified_count, "Carts marked as abandoned");
        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn list_abandoned(&self) -> CartResult<Vec<Cart>> {
        let options = FindOptions::builder()
            .sort(doc! { "abandoned_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "is_abandoned": true })
            .with_options(options)
            .await?;
        let carts: Vec<Cart> = cursor.try_collect().await?;

        Ok(carts)
    }

    #[instrument(skip(self))]
    async fn abandoned_totals(&self, since: DateTime<Utc>) -> CartResult<AbandonedTotals> {
        let count = self
            .collection
            .count_documents(doc! { "is_abandoned": true })
            .await?;

        let recent = self
            .collection
            .count_documents(doc! {
                "is_abandoned": true,
                "abandoned_at": { "$gte": to_bson_date(&since) },
            })
            .await?;

        let pipeline = vec![
            doc! { "$match": { "is_abandoned": true } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$total_price" } } },
        ];
        let mut cursor = self.collection.aggregate(pipeline).await?;
        let total_value = match cursor.try_next().await? {
            Some(group) => group
                .get_i64("total")
                .or_else(|_| group.get_i32("total").map(i64::from))
                .map_err(|e| CartError::Database(e.to_string()))?,
            None => 0,
        };

        Ok(AbandonedTotals {
            count,
            recent,
            total_value,
        })
    }
}
