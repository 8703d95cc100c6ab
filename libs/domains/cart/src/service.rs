//! Cart services - stock-checked cart mutation, checkout pricing and the
//! abandoned-cart sweep

use chrono::{Duration, Utc};
use email::Mailer;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CartError, CartResult};
use crate::models::{
    AbandonedCart, AbandonedCartStats, Cart, CheckoutDraft, CheckoutRequest, CheckoutResponse,
    MarkAbandonedResponse, ProductSnapshot, RecoveryResponse,
};
use crate::pricing;
use crate::repository::{CartRepository, CustomerDirectory, ProductCatalog};

/// Default inactivity threshold of the abandonment sweep
pub const DEFAULT_ABANDONED_HOURS: i64 = 24;

/// Longest accepted inactivity threshold, one year
pub const MAX_ABANDONED_HOURS: i64 = 24 * 365;

const RECOVERY_TEMPLATE: &str = "cart_recovery";

/// Shopper-facing cart operations
pub struct CartService<R: CartRepository> {
    repository: Arc<R>,
    products: Arc<dyn ProductCatalog>,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repository: R, products: Arc<dyn ProductCatalog>) -> Self {
        Self {
            repository: Arc::new(repository),
            products,
        }
    }

    /// The user's cart, created on first access
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> CartResult<Cart> {
        match self.repository.find_by_user(user_id).await? {
            Some(cart) => Ok(cart),
            None => self.repository.create_for_user(user_id).await,
        }
    }

    /// An active product, or `NotFound`
    async fn active_product(&self, product_id: Uuid) -> CartResult<ProductSnapshot> {
        self.products
            .find_product(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(CartError::product_not_found)
    }

    #[instrument(skip(self))]
    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> CartResult<Cart> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self.active_product(product_id).await?;
        if product.stock < quantity {
            return Err(CartError::OutOfStock);
        }

        let mut cart = self.get_cart(user_id).await?;
        cart.add(&product, quantity)?;

        let cart = self.repository.save(cart).await?;
        tracing::info!(cart_id = %cart.id, product_id = %product_id, quantity, "Item added to cart");
        Ok(cart)
    }

    #[instrument(skip(self))]
    pub async fn update_item(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> CartResult<Cart> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let mut cart = self
            .repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(CartError::cart_not_found)?;
        let product_id = cart
            .item(item_id)
            .ok_or_else(CartError::item_not_found)?
            .product_id;

        let product = self.active_product(product_id).await?;
        cart.set_quantity(item_id, quantity, product.stock)?;

        self.repository.save(cart).await
    }

    /// Remove a line item. An unknown item id leaves the items as they are.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> CartResult<Cart> {
        let mut cart = self
            .repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(CartError::cart_not_found)?;

        if !cart.remove(item_id) {
            tracing::debug!(cart_id = %cart.id, item_id = %item_id, "Item not in cart");
        }

        self.repository.save(cart).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> CartResult<Cart> {
        let mut cart = self.get_cart(user_id).await?;
        cart.clear();
        self.repository.save(cart).await
    }

    /// Price the cart for order creation after re-checking every line against the
    /// catalog. Neither stock nor the cart are modified.
    #[instrument(skip(self, input))]
    pub async fn checkout(&self, user_id: Uuid, input: CheckoutRequest) -> CartResult<CheckoutResponse> {
        let (shipping_address, payment_method) = match (input.shipping_address, input.payment_method) {
            (Some(address), Some(method)) if !method.trim().is_empty() => (address, method),
            _ => return Err(CartError::MissingField),
        };
        shipping_address
            .validate()
            .map_err(|e| CartError::Validation(e.to_string()))?;

        let cart = self
            .repository
            .find_by_user(user_id)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or(CartError::EmptyCart)?;

        let ids: Vec<Uuid> = cart.items().iter().map(|item| item.product_id).collect();
        let products: HashMap<Uuid, ProductSnapshot> = self
            .products
            .find_products(&ids)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .map(|p| (p.id, p))
            .collect();

        for item in cart.items() {
            let product = products
                .get(&item.product_id)
                .ok_or_else(|| CartError::ProductGone(item.name.clone()))?;
            if product.stock < item.quantity {
                return Err(CartError::InsufficientStockFor(product.name.clone()));
            }
        }

        let order_draft = CheckoutDraft::from_cart(&cart, shipping_address, payment_method);
        tracing::info!(
            cart_id = %cart.id,
            total_price = order_draft.total_price,
            "Checkout draft prepared"
        );

        Ok(CheckoutResponse { order_draft, cart })
    }
}

impl<R: CartRepository> Clone for CartService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            products: Arc::clone(&self.products),
        }
    }
}

#[derive(Serialize)]
struct RecoveryLine<'a> {
    name: &'a str,
    quantity: i32,
    line_total: i64,
}

#[derive(Serialize)]
struct RecoveryEmail<'a> {
    name: &'a str,
    items: Vec<RecoveryLine<'a>>,
    total: i64,
    cart_url: String,
}

/// Admin-facing abandoned cart operations
pub struct AbandonmentService<R: CartRepository> {
    repository: Arc<R>,
    customers: Arc<dyn CustomerDirectory>,
    mailer: Mailer,
    client_url: String,
    default_hours: i64,
}

impl<R: CartRepository> AbandonmentService<R> {
    pub fn new(
        repository: R,
        customers: Arc<dyn CustomerDirectory>,
        mailer: Mailer,
        client_url: impl Into<String>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            customers,
            mailer,
            client_url: client_url.into().trim_end_matches('/').to_string(),
            default_hours: DEFAULT_ABANDONED_HOURS,
        }
    }

    /// Threshold used when the sweep is called without `hours`
    pub fn with_default_hours(mut self, hours: i64) -> Self {
        self.default_hours = hours;
        self
    }

    #[instrument(skip(self))]
    pub async fn mark_abandoned(&self, hours: Option<i64>) -> CartResult<MarkAbandonedResponse> {
        let hours = hours.unwrap_or(self.default_hours);
        let now = Utc::now();
        let cutoff = Some(hours)
            .filter(|hours| (1..=MAX_ABANDONED_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .and_then(|idle| now.checked_sub_signed(idle))
            .ok_or_else(|| {
                CartError::Validation(format!(
                    "hours must be between 1 and {}",
                    MAX_ABANDONED_HOURS
                ))
            })?;

        let modified_count = self.repository.mark_abandoned(cutoff, now).await?;

        tracing::info!(modified_count, hours, "Abandonment sweep finished");
        Ok(MarkAbandonedResponse {
            modified_count,
            message: format!("{} carts marked as abandoned", modified_count),
        })
    }

    #[instrument(skip(self))]
    pub async fn abandoned(&self) -> CartResult<Vec<AbandonedCart>> {
        let carts = self.repository.list_abandoned().await?;

        let mut owner_ids: Vec<Uuid> = carts.iter().map(|c| c.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<Uuid, _> = self
            .customers
            .find_customers(&owner_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(carts
            .into_iter()
            .map(|cart| AbandonedCart {
                user: owners.get(&cart.user_id).cloned(),
                cart,
            })
            .collect())
    }

    /// Revive an abandoned cart and remind its owner.
    ///
    /// A failed reminder is logged; the cart stays recovered.
    #[instrument(skip(self))]
    pub async fn recover(&self, cart_id: Uuid) -> CartResult<RecoveryResponse> {
        let mut cart = self
            .repository
            .find_by_id(cart_id)
            .await?
            .ok_or_else(CartError::cart_not_found)?;

        if !cart.is_abandoned {
            return Err(CartError::NotAbandoned);
        }

        let owner = self
            .customers
            .find_customer(cart.user_id)
            .await?
            .ok_or_else(CartError::user_not_found)?;

        cart.recover(Utc::now());
        let cart = self.repository.save(cart).await?;
        tracing::info!(cart_id = %cart.id, user_id = %owner.id, "Abandoned cart recovered");

        let data = RecoveryEmail {
            name: &owner.name,
            items: cart
                .items()
                .iter()
                .map(|item| RecoveryLine {
                    name: &item.name,
                    quantity: item.quantity,
                    line_total: item.line_total(),
                })
                .collect(),
            total: cart.total_price(),
            cart_url: format!("{}/cart", self.client_url),
        };

        if let Err(e) = self
            .mailer
            .send_template(&owner.email, RECOVERY_TEMPLATE, &data)
            .await
        {
            tracing::warn!(cart_id = %cart.id, error = %e, "Failed to send cart recovery email");
        }

        Ok(RecoveryResponse {
            message: format!("Recovery email sent to {}", owner.email),
            cart,
        })
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> CartResult<AbandonedCartStats> {
        let since = Utc::now() - Duration::hours(24);
        let totals = self.repository.abandoned_totals(since).await?;

        Ok(AbandonedCartStats {
            total_abandoned: totals.count,
            abandoned_last_24_hours: totals.recent,
            total_value: totals.total_value,
            average_value: pricing::average(totals.total_value, totals.count),
        })
    }
}

impl<R: CartRepository> Clone for AbandonmentService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            customers: Arc::clone(&self.customers),
            mailer: self.mailer.clone(),
            client_url: self.client_url.clone(),
            default_hours: self.default_hours,
        }
    }
}
