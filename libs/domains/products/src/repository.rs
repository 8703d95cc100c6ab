use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{compare_by, Highlight, Product, ProductQuery, SearchStage};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Products among `ids` that exist, in no particular order
    async fn get_many(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>>;

    /// One page of products matching `query`, plus the total match count
    async fn list(&self, query: ProductQuery) -> ProductResult<(Vec<Product>, u64)>;

    async fn highlights(&self, shelf: Highlight) -> ProductResult<Vec<Product>>;

    /// Active products matching `term` at one stage of the quick search
    async fn search(
        &self,
        stage: SearchStage,
        term: &str,
        limit: i64,
    ) -> ProductResult<Vec<Product>>;

    /// Replace the stored product
    async fn update(&self, product: Product) -> ProductResult<Product>;

    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Number of products referencing a brand
    async fn count_by_brand(&self, brand_id: Uuid) -> ProductResult<u64>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(&self, query: ProductQuery) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;

        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_by(&query.sort, a, b));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.page.skip() as usize)
            .take(query.page.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn highlights(&self, shelf: Highlight) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| shelf.includes(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| compare_by(&[shelf.sort()], a, b));
        result.truncate(shelf.limit() as usize);

        Ok(result)
    }

    async fn search(
        &self,
        stage: SearchStage,
        term: &str,
        limit: i64,
    ) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| stage.matches(p, term))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result.truncate(limit.max(0) as usize);

        Ok(result)
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if !products.contains_key(&product.id) {
            return Err(ProductError::NotFound);
        }
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let removed = products.remove(&id).is_some();

        if removed {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(removed)
    }

    async fn count_by_brand(&self, brand_id: Uuid) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.brand_id == Some(brand_id))
            .count() as u64)
    }
}
