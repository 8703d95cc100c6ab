//! Checkout arithmetic. Every amount is in cents.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sales tax, in percent of the items subtotal.
pub const TAX_RATE_PERCENT: i64 = 15;

/// Orders strictly above this subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 10_000;

/// Shipping charged at or below [`FREE_SHIPPING_THRESHOLD`].
pub const FLAT_SHIPPING_FEE: i64 = 1_000;

/// Largest subtotal a cart may hold. Tax and grand total of any cart stay
/// far inside `i64`.
pub const MAX_CART_TOTAL: i64 = 1_000_000_000_000;

/// `numerator / denominator` rounded half away from zero.
///
/// `denominator` must be positive.
pub fn div_round_half_up(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

pub fn tax_for(items_price: i64) -> i64 {
    div_round_half_up(items_price.saturating_mul(TAX_RATE_PERCENT), 100)
}

pub fn shipping_for(items_price: i64) -> i64 {
    if items_price > FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// Mean of `count` values summing to `total`, 0 for an empty set.
pub fn average(total: i64, count: u64) -> i64 {
    match i64::try_from(count) {
        Ok(count) if count > 0 => div_round_half_up(total, count),
        _ => 0,
    }
}

/// Items, tax, shipping and grand total of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceBreakdown {
    pub items_price: i64,
    pub tax_price: i64,
    pub shipping_price: i64,
    pub total_price: i64,
}

impl PriceBreakdown {
    pub fn for_items(items_price: i64) -> Self {
        let tax_price = tax_for(items_price);
        let shipping_price = shipping_for(items_price);

        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price
                .saturating_add(tax_price)
                .saturating_add(shipping_price),
        }
    }
}
