use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{AbandonedTotals, Cart, Customer, ProductSnapshot};

/// Repository trait for Cart persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Get the cart owned by a user
    async fn find_by_user(&self, user_id: Uuid) -> CartResult<Option<Cart>>;

    /// Get a cart by ID
    async fn find_by_id(&self, id: Uuid) -> CartResult<Option<Cart>>;

    /// Create an empty cart for a user, or return the one that already exists
    async fn create_for_user(&self, user_id: Uuid) -> CartResult<Cart>;

    /// Persist `cart` if nobody else wrote it since it was read.
    ///
    /// Returns the stored cart with its bumped version, or [`CartError::Conflict`]
    /// when the stored version no longer matches `cart.version`.
    async fn save(&self, cart: Cart) -> CartResult<Cart>;

    /// Flag every non-empty, non-abandoned cart inactive since before `cutoff`
    async fn mark_abandoned(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> CartResult<u64>;

    /// Abandoned carts, most recently abandoned first
    async fn list_abandoned(&self) -> CartResult<Vec<Cart>>;

    /// Count and value of abandoned carts; `recent` counts those abandoned since `since`
    async fn abandoned_totals(&self, since: DateTime<Utc>) -> CartResult<AbandonedTotals>;
}

/// Product lookup used to price and stock-check cart lines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_product(&self, id: Uuid) -> CartResult<Option<ProductSnapshot>>;

    /// Products among `ids` that still exist, in no particular order
    async fn find_products(&self, ids: &[Uuid]) -> CartResult<Vec<ProductSnapshot>>;
}

/// Customer lookup used for recovery outreach
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_customer(&self, id: Uuid) -> CartResult<Option<Customer>>;

    async fn find_customers(&self, ids: &[Uuid]) -> CartResult<Vec<Customer>>;
}

/// In-memory implementation of CartRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `cart` as-is, bypassing the version check
    pub async fn seed(&self, cart: Cart) {
        self.carts.write().await.insert(cart.id, cart);
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> CartResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> CartResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts.get(&id).cloned())
    }

    async fn create_for_user(&self, user_id: Uuid) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;

        if let Some(existing) = carts.values().find(|c| c.user_id == user_id) {
            return Ok(existing.clone());
        }

        let cart = Cart::new(user_id);
        carts.insert(cart.id, cart.clone());

        tracing::info!(cart_id = %cart.id, user_id = %user_id, "Created cart");
        Ok(cart)
    }

    async fn save(&self, mut cart: Cart) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;

        let stored = carts.get(&cart.id).ok_or_else(CartError::cart_not_found)?;
        if stored.version != cart.version {
            return Err(CartError::Conflict);
        }

        cart.version += 1;
        cart.updated_at = Utc::now();
        carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn mark_abandoned(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> CartResult<u64> {
        let mut carts = self.carts.write().await;
        let mut modified = 0;

        for cart in carts.values_mut() {
            if !cart.is_empty() && !cart.is_abandoned && cart.last_active < cutoff {
                cart.mark_abandoned(now);
                cart.version += 1;
                cart.updated_at = now;
                modified += 1;
            }
        }

        Ok(modified)
    }

    async fn list_abandoned(&self) -> CartResult<Vec<Cart>> {
        let carts = self.carts.read().await;

        let mut result: Vec<Cart> = carts.values().filter(|c| c.is_abandoned).cloned().collect();
        result.sort_by(|a, b| b.abandoned_at.cmp(&a.abandoned_at));

        Ok(result)
    }

    async fn abandoned_totals(&self, since: DateTime<Utc>) -> CartResult<AbandonedTotals> {
        let carts = self.carts.read().await;

        let totals = carts
            .values()
            .filter(|c| c.is_abandoned)
            .fold(AbandonedTotals::default(), |mut acc, cart| {
                acc.count += 1;
                acc.total_value += cart.total_price();
                if cart.abandoned_at.is_some_and(|at| at >= since) {
                    acc.recent += 1;
                }
                acc
            });

        Ok(totals)
    }
}

/// In-memory product lookup (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<Uuid, ProductSnapshot>>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: ProductSnapshot) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn remove(&self, id: Uuid) {
        self.products.write().await.remove(&id);
    }

    pub async fn set_stock(&self, id: Uuid, stock: i32) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.stock = stock;
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_product(&self, id: Uuid) -> CartResult<Option<ProductSnapshot>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_products(&self, ids: &[Uuid]) -> CartResult<Vec<ProductSnapshot>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

/// In-memory customer lookup (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerDirectory {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, customer: Customer) {
        self.customers.write().await.insert(customer.id, customer);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn find_customer(&self, id: Uuid) -> CartResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn find_customers(&self, ids: &[Uuid]) -> CartResult<Vec<Customer>> {
        let customers = self.customers.read().await;
        Ok(ids.iter().filter_map(|id| customers.get(id).cloned()).collect())
    }
}
