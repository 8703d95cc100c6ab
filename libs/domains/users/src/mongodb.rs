//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::{contains_ci, find_page, uuid_bson, uuid_in};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserQuery};
use crate::repository::UserRepository;

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<User>("users");
        Self { collection }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "role": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_role_created".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn build_filter(query: &UserQuery) -> Document {
        let mut filter = Document::new();

        if let Some(role) = query.role {
            filter.insert("role", role.to_string());
        }
        if let Some(term) = &query.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "name": contains_ci(term) },
                    doc! { "email": contains_ci(term) },
                ],
            );
        }

        filter
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection.insert_one(&user).await?;
        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> UserResult<Vec<User>> {
        let cursor = self.collection.find(doc! { "_id": uuid_in(ids) }).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self, query), fields(page = query.page.page, limit = query.page.limit))]
    async fn list(&self, query: UserQuery) -> UserResult<(Vec<User>, u64)> {
        let (users, total) = find_page(
            &self.collection,
            Self::build_filter(&query),
            doc! { "created_at": -1 },
            query.page.skip(),
            query.page.limit as i64,
        )
        .await?;

        Ok((users, total))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(user.id) }, &user)
            .await?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %user.id, "User updated successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(user_id = %id, "User deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}
