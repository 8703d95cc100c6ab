//! MongoDB implementations of the catalog repositories

use async_trait::async_trait;
use database::mongodb::{is_duplicate_key, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, Category};
use crate::repository::{BrandRepository, CategoryRepository};

fn unique_name_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name("idx_name_unique".to_string())
                .build(),
        )
        .build()
}

/// MongoDB implementation of the CategoryRepository
#[derive(Clone)]
pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Category>("categories");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            unique_name_index(),
            IndexModel::builder()
                .keys(doc! { "parent_id": 1 })
                .options(IndexOptions::builder().name("idx_parent".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    fn duplicate(err: mongodb::error::Error) -> CatalogError {
        if is_duplicate_key(&err) {
            CatalogError::DuplicateCategory
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn create(&self, category: Category) -> CatalogResult<Category> {
        self.collection
            .insert_one(&category)
            .await
            .map_err(Self::duplicate)?;
        tracing::info!(category_id = %category.id, "Category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let category = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Category>> {
        let category = self.collection.find_one(doc! { "name": name }).await?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn list(&self, active_only: bool) -> CatalogResult<Vec<Category>> {
        let filter = if active_only {
            doc! { "is_active": true }
        } else {
            Document::new()
        };

        let cursor = self.collection.find(filter).sort(doc! { "name": 1 }).await?;
        let categories: Vec<Category> = cursor.try_collect().await?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn count_children(&self, id: Uuid) -> CatalogResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "parent_id": uuid_bson(id) })
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update(&self, category: Category) -> CatalogResult<Category> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(category.id) }, &category)
            .await
            .map_err(Self::duplicate)?;

        if result.matched_count == 0 {
            return Err(CatalogError::CategoryNotFound);
        }

        tracing::info!(category_id = %category.id, "Category updated successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(category_id = %id, "Category deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB implementation of the BrandRepository
#[derive(Clone)]
pub struct MongoBrandRepository {
    collection: Collection<Brand>,
}

impl MongoBrandRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Brand>("brands");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            unique_name_index(),
            IndexModel::builder()
                .keys(doc! { "featured": 1, "is_active": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_featured_active".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Brand indexes created successfully");
        Ok(())
    }

    fn build_filter(active_only: bool, featured_only: bool) -> Document {
        let mut filter = Document::new();
        if active_only {
            filter.insert("is_active", true);
        }
        if featured_only {
            filter.insert("featured", true);
        }
        filter
    }

    fn duplicate(err: mongodb::error::Error) -> CatalogError {
        if is_duplicate_key(&err) {
            CatalogError::DuplicateBrand
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl BrandRepository for MongoBrandRepository {
    #[instrument(skip(self, brand), fields(brand_id = %brand.id))]
    async fn create(&self, brand: Brand) -> CatalogResult<Brand> {
        self.collection
            .insert_one(&brand)
            .await
            .map_err(Self::duplicate)?;
        tracing::info!(brand_id = %brand.id, "Brand created successfully");
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>> {
        let brand = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Brand>> {
        let brand = self.collection.find_one(doc! { "name": name }).await?;
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn list(&self, active_only: bool, featured_only: bool) -> CatalogResult<Vec<Brand>> {
        let cursor = self
            .collection
            .find(Self::build_filter(active_only, featured_only))
            .sort(doc! { "name": 1 })
            .await?;
        let brands: Vec<Brand> = cursor.try_collect().await?;
        Ok(brands)
    }

    #[instrument(skip(self, brand), fields(brand_id = %brand.id))]
    async fn update(&self, brand: Brand) -> CatalogResult<Brand> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(brand.id) }, &brand)
            .await
            .map_err(Self::duplicate)?;

        if result.matched_count == 0 {
            return Err(CatalogError::BrandNotFound);
        }

        tracing::info!(brand_id = %brand.id, "Brand updated successfully");
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(brand_id = %id, "Brand deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}
