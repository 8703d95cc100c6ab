use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, Category};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category; `DuplicateCategory` when the name is taken
    async fn create(&self, category: Category) -> CatalogResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Category>>;

    /// All categories sorted by name, optionally only the active ones
    async fn list(&self, active_only: bool) -> CatalogResult<Vec<Category>>;

    /// Number of categories whose parent is `id`
    async fn count_children(&self, id: Uuid) -> CatalogResult<u64>;

    async fn update(&self, category: Category) -> CatalogResult<Category>;

    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}

/// Repository trait for Brand persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Insert a brand; `DuplicateBrand` when the name is taken
    async fn create(&self, brand: Brand) -> CatalogResult<Brand>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>>;

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Brand>>;

    /// Brands sorted by name
    async fn list(&self, active_only: bool, featured_only: bool) -> CatalogResult<Vec<Brand>>;

    async fn update(&self, brand: Brand) -> CatalogResult<Brand>;

    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}

/// How many products reference a brand; implemented by the products domain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandUsage: Send + Sync {
    async fn products_for_brand(&self, brand_id: Uuid) -> CatalogResult<u64>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: Category) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.name == category.name) {
            return Err(CatalogError::DuplicateCategory);
        }

        categories.insert(category.id, category.clone());
        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.values().find(|c| c.name == name).cloned())
    }

    async fn list(&self, active_only: bool) -> CatalogResult<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut matching: Vec<Category> = categories
            .values()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn count_children(&self, id: Uuid) -> CatalogResult<u64> {
        let categories = self.categories.read().await;
        Ok(categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }

    async fn update(&self, category: Category) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Err(CatalogError::CategoryNotFound);
        }
        if categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(CatalogError::DuplicateCategory);
        }

        categories.insert(category.id, category.clone());
        tracing::info!(category_id = %category.id, "Updated category");
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let removed = self.categories.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(category_id = %id, "Deleted category");
        }
        Ok(removed)
    }
}

/// In-memory implementation of BrandRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBrandRepository {
    brands: Arc<RwLock<HashMap<Uuid, Brand>>>,
}

impl InMemoryBrandRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrandRepository for InMemoryBrandRepository {
    async fn create(&self, brand: Brand) -> CatalogResult<Brand> {
        let mut brands = self.brands.write().await;
        if brands.values().any(|b| b.name == brand.name) {
            return Err(CatalogError::DuplicateBrand);
        }

        brands.insert(brand.id, brand.clone());
        tracing::info!(brand_id = %brand.id, "Created brand");
        Ok(brand)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>> {
        Ok(self.brands.read().await.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Brand>> {
        let brands = self.brands.read().await;
        Ok(brands.values().find(|b| b.name == name).cloned())
    }

    async fn list(&self, active_only: bool, featured_only: bool) -> CatalogResult<Vec<Brand>> {
        let brands = self.brands.read().await;
        let mut matching: Vec<Brand> = brands
            .values()
            .filter(|b| !active_only || b.is_active)
            .filter(|b| !featured_only || b.featured)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn update(&self, brand: Brand) -> CatalogResult<Brand> {
        let mut brands = self.brands.write().await;
        if !brands.contains_key(&brand.id) {
            return Err(CatalogError::BrandNotFound);
        }
        if brands.values().any(|b| b.id != brand.id && b.name == brand.name) {
            return Err(CatalogError::DuplicateBrand);
        }

        brands.insert(brand.id, brand.clone());
        tracing::info!(brand_id = %brand.id, "Updated brand");
        Ok(brand)
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let removed = self.brands.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(brand_id = %id, "Deleted brand");
        }
        Ok(removed)
    }
}

/// Fixed per-brand product counts (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBrandUsage {
    counts: Arc<RwLock<HashMap<Uuid, u64>>>,
}

impl InMemoryBrandUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, brand_id: Uuid, products: u64) {
        self.counts.write().await.insert(brand_id, products);
    }
}

#[async_trait]
impl BrandUsage for InMemoryBrandUsage {
    async fn products_for_brand(&self, brand_id: Uuid) -> CatalogResult<u64> {
        Ok(self
            .counts
            .read()
            .await
            .get(&brand_id)
            .copied()
            .unwrap_or(0))
    }
}
