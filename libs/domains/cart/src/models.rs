use chrono::{DateTime, Utc};
use database::mongodb::serde_helpers::{datetime, option_datetime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CartError, CartResult};
use crate::pricing::{MAX_CART_TOTAL, PriceBreakdown};
use crate::service::MAX_ABANDONED_HOURS;

/// One product in a cart, priced when it was added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Product name when the item was added
    pub name: String,
    /// First product image when the item was added
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price in cents, fixed at add time
    pub unit_price: i64,
    pub quantity: i32,
}

impl CartLineItem {
    fn snapshot(product: &ProductSnapshot, quantity: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_id: product.id,
            name: product.name.clone(),
            image: product.images.first().cloned(),
            unit_price: product.effective_price(),
            quantity,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }

    fn checked_line_total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Sum of line totals, or `TotalTooLarge` past [`MAX_CART_TOTAL`]
fn priced(items: &[CartLineItem]) -> CartResult<i64> {
    items
        .iter()
        .try_fold(0i64, |total, item| {
            item.checked_line_total()
                .and_then(|line| total.checked_add(line))
        })
        .filter(|total| *total <= MAX_CART_TOTAL)
        .ok_or(CartError::TotalTooLarge {
            max: MAX_CART_TOTAL,
        })
}

/// A user's shopping cart.
///
/// `items` and `total_price` are only changed through the methods below, each of
/// which recomputes the total, so `total_price` always equals the sum of the line totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    items: Vec<CartLineItem>,
    /// Sum of line totals, in cents
    #[serde(default)]
    total_price: i64,
    #[serde(with = "datetime")]
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub is_abandoned: bool,
    #[serde(default, with = "option_datetime")]
    pub abandoned_at: Option<DateTime<Utc>>,
    /// Incremented by every write; writes against a stale version are rejected
    #[serde(default)]
    pub version: i64,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            items: Vec::new(),
            total_price: 0,
            last_active: now,
            is_abandoned: false,
            abandoned_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn total_price(&self) -> i64 {
        self.total_price
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, item_id: Uuid) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Add `quantity` of `product`, merging into an existing line for the same product.
    ///
    /// Leaves the cart untouched on error.
    pub fn add(&mut self, product: &ProductSnapshot, quantity: i32) -> CartResult<()> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if product.stock < quantity {
            return Err(CartError::OutOfStock);
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => {
                let new_quantity = item.quantity.saturating_add(quantity);
                if new_quantity > product.stock {
                    return Err(CartError::InsufficientStock { max: product.stock });
                }
                item.quantity = new_quantity;
            }
            None => items.push(CartLineItem::snapshot(product, quantity)),
        }

        let total_price = priced(&items)?;
        self.items = items;
        self.touch(total_price);
        Ok(())
    }

    /// Set the quantity of line `item_id`, checked against the product's current `stock`.
    pub fn set_quantity(&mut self, item_id: Uuid, quantity: i32, stock: i32) -> CartResult<()> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity > stock {
            return Err(CartError::InsufficientStock { max: stock });
        }

        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(CartError::item_not_found)?;
        item.quantity = quantity;

        let total_price = priced(&items)?;
        self.items = items;
        self.touch(total_price);
        Ok(())
    }

    /// Drop line `item_id`. Returns whether a line was removed; the total is
    /// recomputed either way.
    pub fn remove(&mut self, item_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        // Dropping lines never raises the total past the cap.
        let total_price = self.items.iter().map(CartLineItem::line_total).sum();
        self.touch(total_price);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch(0);
    }

    /// Flag the cart for recovery outreach.
    pub fn mark_abandoned(&mut self, now: DateTime<Utc>) {
        self.is_abandoned = true;
        self.abandoned_at = Some(now);
    }

    /// Bring an abandoned cart back to life after a reminder.
    pub fn recover(&mut self, now: DateTime<Utc>) {
        self.is_abandoned = false;
        self.abandoned_at = None;
        self.last_active = now;
    }

    /// Any shopper activity refreshes `last_active` and revives an abandoned cart.
    fn touch(&mut self, total_price: i64) {
        self.total_price = total_price;
        self.recover(Utc::now());
    }
}

/// What the cart needs to know about a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    /// List price in cents
    pub price: i64,
    pub discount_price: Option<i64>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
}

impl ProductSnapshot {
    /// The discount price when set and positive, otherwise the list price.
    pub fn effective_price(&self) -> i64 {
        match self.discount_price {
            Some(discount) if discount > 0 => discount,
            _ => self.price,
        }
    }
}

/// Cart owner contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// DTO for adding a product to the cart
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddToCart {
    pub product_id: Uuid,
    /// Defaults to 1
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// DTO for changing a line item's quantity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCartItem {
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// DTO for checkout. Both fields are required; their absence is reported as a
/// business error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    #[serde(default)]
    #[validate(nested)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// One line of the order handed to order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    /// Unit price in cents
    pub price: i64,
    pub quantity: i32,
}

impl From<&CartLineItem> for OrderItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image: item.image.clone(),
            price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Priced order derived from a cart at checkout. Not persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutDraft {
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: i64,
    pub tax_price: i64,
    pub shipping_price: i64,
    pub total_price: i64,
}

impl CheckoutDraft {
    pub fn from_cart(cart: &Cart, shipping_address: ShippingAddress, payment_method: String) -> Self {
        let price = PriceBreakdown::for_items(cart.total_price());

        Self {
            user_id: cart.user_id,
            order_items: cart.items().iter().map(OrderItem::from).collect(),
            shipping_address,
            payment_method,
            items_price: price.items_price,
            tax_price: price.tax_price,
            shipping_price: price.shipping_price,
            total_price: price.total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_draft: CheckoutDraft,
    pub cart: Cart,
}

/// DTO for the abandonment sweep
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MarkAbandonedRequest {
    /// Inactivity threshold; defaults to the configured value
    #[serde(default)]
    #[validate(range(min = 1, max = MAX_ABANDONED_HOURS))]
    pub hours: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MarkAbandonedResponse {
    pub modified_count: u64,
    pub message: String,
}

/// An abandoned cart with its owner, when the owner still exists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AbandonedCart {
    pub cart: Cart,
    pub user: Option<Customer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecoveryResponse {
    pub message: String,
    pub cart: Cart,
}

/// Raw aggregates over abandoned carts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbandonedTotals {
    pub count: u64,
    /// Abandoned at or after the `since` cutoff
    pub recent: u64,
    /// Sum of `total_price`, in cents
    pub total_value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AbandonedCartStats {
    pub total_abandoned: u64,
    pub abandoned_last_24_hours: u64,
    /// Cents
    pub total_value: i64,
    /// Cents, rounded half up
    pub average_value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, stock: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: Uuid::now_v7(),
            name: "Diver 300".to_string(),
            price,
            discount_price: None,
            stock,
            images: vec!["https://cdn.example.com/products/diver.jpg".to_string()],
            is_active: true,
        }
    }

    fn assert_total_consistent(cart: &Cart) {
        let expected: i64 = cart.items().iter().map(CartLineItem::line_total).sum();
        assert_eq!(cart.total_price(), expected);
    }

    #[test]
    fn test_add_snapshots_product() {
        let mut cart = Cart::new(Uuid::now_v7());
        let mut diver = product(25_000, 5);
        diver.discount_price = Some(19_900);

        cart.add(&diver, 2).unwrap();

        let item = &cart.items()[0];
        assert_eq!(item.unit_price, 19_900);
        assert_eq!(item.name, "Diver 300");
        assert_eq!(item.image.as_deref(), Some("https://cdn.example.com/products/diver.jpg"));
        assert_eq!(cart.total_price(), 39_800);
    }

    #[test]
    fn test_zero_discount_uses_list_price() {
        let mut p = product(25_000, 5);
        p.discount_price = Some(0);
        assert_eq!(p.effective_price(), 25_000);
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let mut cart = Cart::new(Uuid::now_v7());
        let p = product(1_000, 10);

        cart.add(&p, 2).unwrap();
        cart.add(&p, 3).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_total_consistent(&cart);
    }

    #[test]
    fn test_add_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new(Uuid::now_v7());
        let p = product(1_000, 4);
        cart.add(&p, 3).unwrap();
        let before = cart.clone();

        let err = cart.add(&p, 2).unwrap_err();

        assert!(matches!(err, CartError::InsufficientStock { max: 4 }));
        assert_eq!(cart.items(), before.items());
        assert_eq!(cart.total_price(), before.total_price());
    }

    #[test]
    fn test_add_more_than_stock_is_out_of_stock() {
        let mut cart = Cart::new(Uuid::now_v7());
        let err = cart.add(&product(1_000, 1), 2).unwrap_err();
        assert!(matches!(err, CartError::OutOfStock));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new(Uuid::now_v7());
        assert!(matches!(cart.add(&product(1_000, 5), 0), Err(CartError::InvalidQuantity)));
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(1_500, 10), 1).unwrap();
        let item_id = cart.items()[0].id;

        cart.set_quantity(item_id, 4, 10).unwrap();
        assert_eq!(cart.total_price(), 6_000);

        assert!(matches!(
            cart.set_quantity(item_id, 11, 10),
            Err(CartError::InsufficientStock { max: 10 })
        ));
        assert!(matches!(
            cart.set_quantity(Uuid::now_v7(), 1, 10),
            Err(CartError::NotFound(_))
        ));
        assert_eq!(cart.total_price(), 6_000);
    }

    #[test]
    fn test_add_past_total_cap_leaves_cart_unchanged() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(1_000, 10), 1).unwrap();
        let before = cart.clone();

        let err = cart.add(&product(i64::MAX / 2, 10), 3).unwrap_err();
        assert!(matches!(err, CartError::TotalTooLarge { max: MAX_CART_TOTAL }));

        let err = cart.add(&product(MAX_CART_TOTAL, 10), 1).unwrap_err();
        assert!(matches!(err, CartError::TotalTooLarge { .. }));

        assert_eq!(cart.items(), before.items());
        assert_eq!(cart.total_price(), 1_000);
    }

    #[test]
    fn test_set_quantity_past_total_cap_is_rejected() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(MAX_CART_TOTAL / 2, i32::MAX), 1).unwrap();
        let item_id = cart.items()[0].id;

        cart.set_quantity(item_id, 2, i32::MAX).unwrap();
        assert_eq!(cart.total_price(), MAX_CART_TOTAL);

        let err = cart.set_quantity(item_id, i32::MAX, i32::MAX).unwrap_err();
        assert!(matches!(err, CartError::TotalTooLarge { .. }));
        assert_eq!(cart.items()[0].quantity, 2);
        assert_total_consistent(&cart);
    }

    #[test]
    fn test_unit_price_is_not_refreshed_on_merge() {
        let mut cart = Cart::new(Uuid::now_v7());
        let mut p = product(1_000, 10);
        cart.add(&p, 1).unwrap();

        p.price = 4_000;
        cart.add(&p, 2).unwrap();

        assert_eq!(cart.items()[0].unit_price, 1_000);
        assert_eq!(cart.total_price(), 3_000);
    }

    #[test]
    fn test_remove_last_item_zeroes_total() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(1_000, 10), 2).unwrap();
        let item_id = cart.items()[0].id;

        assert!(cart.remove(item_id));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), 0);
        assert!(!cart.remove(item_id));
    }

    #[test]
    fn test_mutation_revives_abandoned_cart() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.mark_abandoned(Utc::now());

        cart.add(&product(1_000, 10), 1).unwrap();

        assert!(!cart.is_abandoned);
        assert!(cart.abandoned_at.is_none());
    }

    #[test]
    fn test_checkout_draft_pricing() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(5_000, 10), 1).unwrap();

        let address = ShippingAddress {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: None,
            zip_code: "12345".into(),
            country: "US".into(),
            phone_number: None,
        };
        let draft = CheckoutDraft::from_cart(&cart, address, "card".into());

        assert_eq!(draft.items_price, 5_000);
        assert_eq!(draft.tax_price, 750);
        assert_eq!(draft.shipping_price, 1_000);
        assert_eq!(draft.total_price, 6_750);
        assert_eq!(draft.order_items[0].price, 5_000);
    }

    #[test]
    fn test_bson_round_trip_keeps_dates_as_dates() {
        let mut cart = Cart::new(Uuid::now_v7());
        cart.add(&product(1_000, 10), 1).unwrap();

        let raw = mongodb::bson::to_raw_document_buf(&cart).unwrap();
        assert!(raw.get_datetime("last_active").is_ok());
        assert!(raw.get_binary("user_id").is_ok());

        let back: Cart = mongodb::bson::from_slice(raw.as_bytes()).unwrap();
        assert_eq!(back.items(), cart.items());
        assert_eq!(back.total_price(), 1_000);
    }
}
