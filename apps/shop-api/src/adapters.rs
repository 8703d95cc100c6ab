//! Cross-domain lookups.
//!
//! Domain crates declare the narrow ports they need from each other (the cart
//! needs product snapshots and customer contacts, brands need a product count,
//! warranties need a product's warranty period). The binary is the only place
//! that depends on every domain, so the ports are implemented here on top of
//! the products and users repositories.

use std::sync::Arc;

use async_trait::async_trait;
use domain_cart::{
    CartError, CartResult, Customer, CustomerDirectory, ProductCatalog, ProductSnapshot,
};
use domain_catalog::{BrandUsage, CatalogError, CatalogResult};
use domain_products::{Product, ProductRepository};
use domain_support::{SupportError, SupportResult, WarrantyCatalog};
use domain_users::{User, UserRepository};
use uuid::Uuid;

/// Product repository seen through the other domains' ports
pub struct ProductLookup<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductLookup<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

impl<R: ProductRepository> Clone for ProductLookup<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn snapshot(product: Product) -> ProductSnapshot {
    ProductSnapshot {
        id: product.id,
        name: product.name,
        price: product.price,
        discount_price: product.discount_price,
        stock: product.stock,
        images: product.images,
        is_active: product.is_active,
    }
}

#[async_trait]
impl<R: ProductRepository + 'static> ProductCatalog for ProductLookup<R> {
    async fn find_product(&self, id: Uuid) -> CartResult<Option<ProductSnapshot>> {
        let product = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;
        Ok(product.map(snapshot))
    }

    async fn find_products(&self, ids: &[Uuid]) -> CartResult<Vec<ProductSnapshot>> {
        let products = self
            .repository
            .get_many(ids)
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;
        Ok(products.into_iter().map(snapshot).collect())
    }
}

#[async_trait]
impl<R: ProductRepository + 'static> BrandUsage for ProductLookup<R> {
    async fn products_for_brand(&self, brand_id: Uuid) -> CatalogResult<u64> {
        self.repository
            .count_by_brand(brand_id)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))
    }
}

#[async_trait]
impl<R: ProductRepository + 'static> WarrantyCatalog for ProductLookup<R> {
    async fn warranty_months(&self, product_id: Uuid) -> SupportResult<Option<u32>> {
        let product = self
            .repository
            .get_by_id(product_id)
            .await
            .map_err(|e| SupportError::Database(e.to_string()))?;
        Ok(product.map(|p| p.warranty_months()))
    }
}

/// User repository seen as the cart's customer directory
pub struct CustomerLookup<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> CustomerLookup<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

fn customer(user: User) -> Customer {
    Customer {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

#[async_trait]
impl<R: UserRepository + 'static> CustomerDirectory for CustomerLookup<R> {
    async fn find_customer(&self, id: Uuid) -> CartResult<Option<Customer>> {
        let user = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;
        Ok(user.map(customer))
    }

    async fn find_customers(&self, ids: &[Uuid]) -> CartResult<Vec<Customer>> {
        let users = self
            .repository
            .get_many(ids)
            .await
            .map_err(|e| CartError::Database(e.to_string()))?;
        Ok(users.into_iter().map(customer).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_products::{CreateProduct, InMemoryProductRepository};
    use domain_users::InMemoryUserRepository;
    use serde_json::json;

    async fn seeded_products() -> (ProductLookup<InMemoryProductRepository>, Product, Product) {
        let repository = InMemoryProductRepository::new();

        let brand_id = Uuid::now_v7();
        let diver: CreateProduct = serde_json::from_value(json!({
            "name": "Deep Sea Diver",
            "price": 45_000,
            "discount_price": 39_900,
            "brand_id": brand_id,
            "stock": 4,
            "watch_details": { "warranty_period_months": 36 }
        }))
        .unwrap();
        let dress: CreateProduct = serde_json::from_value(json!({
            "name": "Classic Dress",
            "price": 22_000,
            "stock": 10
        }))
        .unwrap();

        let diver = repository.create(Product::new(diver)).await.unwrap();
        let dress = repository.create(Product::new(dress)).await.unwrap();
        (ProductLookup::new(repository), diver, dress)
    }

    #[tokio::test]
    async fn test_product_snapshot_carries_pricing_and_stock() {
        let (lookup, diver, _) = seeded_products().await;

        let snapshot = lookup.find_product(diver.id).await.unwrap().unwrap();
        assert_eq!(snapshot.name, "Deep Sea Diver");
        assert_eq!(snapshot.effective_price(), 39_900);
        assert_eq!(snapshot.stock, 4);
        assert!(snapshot.is_active);

        assert!(lookup.find_product(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_products_skips_unknown_ids() {
        let (lookup, diver, dress) = seeded_products().await;

        let found = lookup
            .find_products(&[diver.id, Uuid::now_v7(), dress.id])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_brand_usage_counts_products() {
        let (lookup, diver, _) = seeded_products().await;
        let brand_id = diver.brand_id.unwrap();

        assert_eq!(lookup.products_for_brand(brand_id).await.unwrap(), 1);
        assert_eq!(lookup.products_for_brand(Uuid::now_v7()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_warranty_months_defaults_without_watch_details() {
        let (lookup, diver, dress) = seeded_products().await;

        assert_eq!(lookup.warranty_months(diver.id).await.unwrap(), Some(36));
        assert_eq!(lookup.warranty_months(dress.id).await.unwrap(), Some(12));
        assert_eq!(lookup.warranty_months(Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_customer_lookup() {
        let repository = InMemoryUserRepository::new();
        let user = repository
            .create(User::new(
                "Ada".to_string(),
                "ada@example.com",
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let lookup = CustomerLookup::new(repository);

        let found = lookup.find_customer(user.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");
        assert_eq!(found.name, "Ada");

        let many = lookup
            .find_customers(&[user.id, Uuid::now_v7()])
            .await
            .unwrap();
        assert_eq!(many.len(), 1);
    }
}
