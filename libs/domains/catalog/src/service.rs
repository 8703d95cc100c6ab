//! Category and Brand services

use axum_helpers::{public_only, Actor, UploadedFile, Visible};
use std::sync::Arc;
use storage::{delete_quietly, folders, SharedStorage};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    build_tree, Brand, Category, CategoryNode, CreateBrand, CreateCategory, UpdateBrand,
    UpdateCategory,
};
use crate::repository::{BrandRepository, BrandUsage, CategoryRepository};

fn validation(e: validator::ValidationErrors) -> CatalogError {
    CatalogError::Validation(e.to_string())
}

async fn upload_one(
    storage: &SharedStorage,
    folder: &str,
    file: UploadedFile,
) -> CatalogResult<String> {
    let url = storage
        .upload(folder, &file.file_name, &file.content_type, file.bytes.to_vec())
        .await?;
    Ok(url)
}

/// Category service
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
    storage: SharedStorage,
}

impl<R: CategoryRepository> Clone for CategoryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            storage,
        }
    }

    /// Top-level categories with their subcategories
    #[instrument(skip(self, actor))]
    pub async fn tree(&self, actor: Option<&Actor>) -> CatalogResult<Vec<CategoryNode>> {
        let categories = self.repository.list(public_only(actor)).await?;
        Ok(build_tree(categories))
    }

    #[instrument(skip(self, actor))]
    pub async fn list_all(&self, actor: Option<&Actor>) -> CatalogResult<Vec<Category>> {
        self.repository.list(public_only(actor)).await
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, id: Uuid, actor: Option<&Actor>) -> CatalogResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|c| c.is_visible_to(actor))
            .ok_or(CatalogError::CategoryNotFound)
    }

    async fn load(&self, id: Uuid) -> CatalogResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)
    }

    async fn ensure_parent(&self, parent_id: Option<Uuid>) -> CatalogResult<()> {
        if let Some(parent_id) = parent_id {
            if self.repository.get_by_id(parent_id).await?.is_none() {
                return Err(CatalogError::ParentNotFound);
            }
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateCategory) -> CatalogResult<Category> {
        input.validate().map_err(validation)?;

        let category = Category::new(input);
        if self.repository.get_by_name(&category.name).await?.is_some() {
            return Err(CatalogError::DuplicateCategory);
        }
        self.ensure_parent(category.parent_id).await?;

        self.repository.create(category).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        input.validate().map_err(validation)?;
        if input.parent_id == Some(id) {
            return Err(CatalogError::SelfParent);
        }

        let mut category = self.load(id).await?;
        let renamed = input
            .name
            .as_deref()
            .is_some_and(|name| name.trim() != category.name);

        category.apply_update(input);
        if renamed && self.repository.get_by_name(&category.name).await?.is_some() {
            return Err(CatalogError::DuplicateCategory);
        }
        self.ensure_parent(category.parent_id).await?;

        self.repository.update(category).await
    }

    /// Delete a leaf category and its image
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> CatalogResult<()> {
        let category = self.load(id).await?;

        if self.repository.count_children(id).await? > 0 {
            return Err(CatalogError::HasSubcategories);
        }
        if !self.repository.delete(id).await? {
            return Err(CatalogError::CategoryNotFound);
        }

        delete_quietly(self.storage.as_ref(), category.image).await;
        Ok(())
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_image(&self, id: Uuid, file: UploadedFile) -> CatalogResult<Category> {
        let mut category = self.load(id).await?;

        let url = upload_one(&self.storage, folders::CATEGORIES, file).await?;
        let previous = category.image.replace(url.clone());
        category.updated_at = chrono::Utc::now();

        let category = match self.repository.update(category).await {
            Ok(category) => category,
            Err(e) => {
                delete_quietly(self.storage.as_ref(), [url]).await;
                return Err(e);
            }
        };
        delete_quietly(self.storage.as_ref(), previous).await;

        tracing::info!(category_id = %id, "Category image replaced");
        Ok(category)
    }
}

/// Brand service
pub struct BrandService<R: BrandRepository> {
    repository: Arc<R>,
    usage: Arc<dyn BrandUsage>,
    storage: SharedStorage,
}

impl<R: BrandRepository> Clone for BrandService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            usage: Arc::clone(&self.usage),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: BrandRepository> BrandService<R> {
    pub fn new(repository: R, usage: Arc<dyn BrandUsage>, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            usage,
            storage,
        }
    }

    #[instrument(skip(self, actor))]
    pub async fn list(&self, actor: Option<&Actor>) -> CatalogResult<Vec<Brand>> {
        self.repository.list(public_only(actor), false).await
    }

    /// Featured brands; hidden ones never appear, even for admins
    #[instrument(skip(self))]
    pub async fn featured(&self) -> CatalogResult<Vec<Brand>> {
        self.repository.list(true, true).await
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, id: Uuid, actor: Option<&Actor>) -> CatalogResult<Brand> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|b| b.is_visible_to(actor))
            .ok_or(CatalogError::BrandNotFound)
    }

    async fn load(&self, id: Uuid) -> CatalogResult<Brand> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::BrandNotFound)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateBrand) -> CatalogResult<Brand> {
        input.validate().map_err(validation)?;

        let brand = Brand::new(input);
        if self.repository.get_by_name(&brand.name).await?.is_some() {
            return Err(CatalogError::DuplicateBrand);
        }

        self.repository.create(brand).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateBrand) -> CatalogResult<Brand> {
        input.validate().map_err(validation)?;

        let mut brand = self.load(id).await?;
        let renamed = input
            .name
            .as_deref()
            .is_some_and(|name| name.trim() != brand.name);

        brand.apply_update(input);
        if renamed && self.repository.get_by_name(&brand.name).await?.is_some() {
            return Err(CatalogError::DuplicateBrand);
        }

        self.repository.update(brand).await
    }

    /// Delete a brand no product references, and its logo
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> CatalogResult<()> {
        let brand = self.load(id).await?;

        let products = self.usage.products_for_brand(id).await?;
        if products > 0 {
            tracing::warn!(brand_id = %id, products, "Refusing to delete brand in use");
            return Err(CatalogError::BrandInUse);
        }
        if !self.repository.delete(id).await? {
            return Err(CatalogError::BrandNotFound);
        }

        delete_quietly(self.storage.as_ref(), brand.logo).await;
        Ok(())
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_logo(&self, id: Uuid, file: UploadedFile) -> CatalogResult<Brand> {
        let mut brand = self.load(id).await?;

        let url = upload_one(&self.storage, folders::BRANDS, file).await?;
        let previous = brand.logo.replace(url.clone());
        brand.updated_at = chrono::Utc::now();

        let brand = match self.repository.update(brand).await {
            Ok(brand) => brand,
            Err(e) => {
                delete_quietly(self.storage.as_ref(), [url]).await;
                return Err(e);
            }
        };
        delete_quietly(self.storage.as_ref(), previous).await;

        tracing::info!(brand_id = %id, "Brand logo replaced");
        Ok(brand)
    }
}
