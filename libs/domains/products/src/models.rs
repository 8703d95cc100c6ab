use axum_helpers::{PageQuery, Visible};
use chrono::{DateTime, Utc};
use database::mongodb::serde_helpers::datetime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_WARRANTY_MONTHS: u32 = 12;
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
pub const MAX_SEARCH_LIMIT: i64 = 50;
/// Highest list or discount price, in cents
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Watch movement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Movement {
    Automatic,
    Quartz,
    Mechanical,
    Solar,
    Kinetic,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Men,
    Women,
    #[default]
    Unisex,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WatchStyle {
    Casual,
    Dress,
    Sport,
    Luxury,
    Smart,
    Diver,
    Pilot,
    Field,
}

fn default_warranty_months() -> u32 {
    DEFAULT_WARRANTY_MONTHS
}

fn default_true() -> bool {
    true
}

/// Watch-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct WatchDetails {
    #[serde(default)]
    pub movement: Option<Movement>,
    /// Case diameter in millimetres
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub case_size: Option<f64>,
    #[serde(default)]
    pub case_material: Option<String>,
    #[serde(default)]
    pub band_material: Option<String>,
    #[serde(default)]
    pub water_resistance: Option<String>,
    #[serde(default)]
    pub dial_color: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub style: Option<WatchStyle>,
    #[serde(default = "default_warranty_months")]
    pub warranty_period_months: u32,
}

impl Default for WatchDetails {
    fn default() -> Self {
        Self {
            movement: None,
            case_size: None,
            case_material: None,
            band_material: None,
            water_resistance: None,
            dial_color: None,
            gender: Gender::default(),
            style: None,
            warranty_period_months: DEFAULT_WARRANTY_MONTHS,
        }
    }
}

/// A customer review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// 1 to 5
    pub rating: u8,
    pub comment: String,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents
    pub price: i64,
    /// Sale price in cents; used instead of `price` when positive
    #[serde(default)]
    pub discount_price: Option<i64>,
    /// Public URLs of uploaded images
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub stock: i32,
    /// Mean review rating
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub is_new_arrival: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub watch_details: Option<WatchDetails>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description.unwrap_or_default(),
            price: input.price,
            discount_price: input.discount_price,
            images: Vec::new(),
            category_id: input.category_id,
            brand_id: input.brand_id,
            stock: input.stock.unwrap_or(0),
            ratings: 0.0,
            num_reviews: 0,
            featured: input.featured.unwrap_or(false),
            is_best_seller: input.is_best_seller.unwrap_or(false),
            is_new_arrival: input.is_new_arrival.unwrap_or(false),
            is_active: input.is_active.unwrap_or(true),
            tags: input.tags.unwrap_or_default(),
            specifications: input.specifications.unwrap_or_default(),
            watch_details: input.watch_details,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply present fields of `update`
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(discount_price) = update.discount_price {
            self.discount_price = Some(discount_price);
        }
        if let Some(category_id) = update.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(brand_id) = update.brand_id {
            self.brand_id = Some(brand_id);
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(is_best_seller) = update.is_best_seller {
            self.is_best_seller = is_best_seller;
        }
        if let Some(is_new_arrival) = update.is_new_arrival {
            self.is_new_arrival = is_new_arrival;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(specifications) = update.specifications {
            self.specifications = specifications;
        }
        if let Some(watch_details) = update.watch_details {
            self.watch_details = Some(watch_details);
        }
        self.updated_at = Utc::now();
    }

    /// `discount_price` when set and positive, otherwise `price`
    pub fn effective_price(&self) -> i64 {
        match self.discount_price {
            Some(discount) if discount > 0 => discount,
            _ => self.price,
        }
    }

    pub fn warranty_months(&self) -> u32 {
        self.watch_details
            .as_ref()
            .map_or(DEFAULT_WARRANTY_MONTHS, |d| d.warranty_period_months)
    }

    /// Record one review per user and refresh the rating summary
    pub fn add_review(
        &mut self,
        user_id: Uuid,
        name: &str,
        input: CreateReview,
    ) -> ProductResult<()> {
        if self.reviews.iter().any(|r| r.user_id == user_id) {
            return Err(ProductError::AlreadyReviewed);
        }

        self.reviews.push(Review {
            id: Uuid::now_v7(),
            user_id,
            name: name.to_string(),
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        });

        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        self.num_reviews = self.reviews.len() as u32;
        self.ratings = f64::from(sum) / f64::from(self.num_reviews);
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Visible for Product {
    fn is_public(&self) -> bool {
        self.is_active
    }
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    /// Price in cents
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub price: i64,
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub discount_price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_new_arrival: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    #[validate(nested)]
    pub watch_details: Option<WatchDetails>,
}

/// DTO for updating an existing product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = MAX_PRICE))]
    pub discount_price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_new_arrival: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    #[validate(nested)]
    pub watch_details: Option<WatchDetails>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewAdded {
    pub message: String,
    pub num_reviews: u32,
    pub ratings: f64,
}

/// Query parameters for listing products
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub brand: Option<Uuid>,
    /// Minimum price in cents, inclusive
    pub min_price: Option<i64>,
    /// Maximum price in cents, inclusive
    pub max_price: Option<i64>,
    pub min_rating: Option<f64>,
    /// Only products with stock > 0
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_new_arrival: Option<bool>,
    pub gender: Option<Gender>,
    pub movement: Option<Movement>,
    /// Comma separated; matches products carrying any of them
    pub tags: Option<String>,
    /// Case-insensitive match on name and description
    pub search: Option<String>,
    /// Comma separated `[-]field` over created_at, price, name, ratings, stock
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Price,
    Name,
    Ratings,
    Stock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    pub const NEWEST_FIRST: SortKey = SortKey {
        field: SortField::CreatedAt,
        descending: true,
    };

    /// Parse `-created_at,price`; blank input means newest first
    pub fn parse_list(raw: Option<&str>) -> ProductResult<Vec<SortKey>> {
        let keys = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (descending, name) = match part.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, part),
                };
                SortField::from_str(name)
                    .map(|field| SortKey { field, descending })
                    .map_err(|_| ProductError::InvalidSort(name.to_string()))
            })
            .collect::<ProductResult<Vec<_>>>()?;

        if keys.is_empty() {
            Ok(vec![Self::NEWEST_FIRST])
        } else {
            Ok(keys)
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Ratings => a.ratings.total_cmp(&b.ratings),
            SortField::Stock => a.stock.cmp(&b.stock),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Order `a` and `b` by each key in turn
pub fn compare_by(keys: &[SortKey], a: &Product, b: &Product) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// A validated [`ProductFilter`] ready for a repository
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub category: Option<Uuid>,
    pub brand: Option<Uuid>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_rating: Option<f64>,
    pub in_stock: bool,
    pub featured: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_new_arrival: Option<bool>,
    pub gender: Option<Gender>,
    pub movement: Option<Movement>,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub sort: Vec<SortKey>,
    pub page: PageQuery,
    /// Hide inactive products
    pub public_only: bool,
}

impl ProductQuery {
    pub fn from_filter(filter: ProductFilter, public_only: bool) -> ProductResult<Self> {
        let sort = SortKey::parse_list(filter.sort.as_deref())?;
        let tags = filter
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let search = filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            category: filter.category,
            brand: filter.brand,
            min_price: filter.min_price,
            max_price: filter.max_price,
            min_rating: filter.min_rating,
            in_stock: filter.in_stock.unwrap_or(false),
            featured: filter.featured,
            is_best_seller: filter.is_best_seller,
            is_new_arrival: filter.is_new_arrival,
            gender: filter.gender,
            movement: filter.movement,
            tags,
            search,
            sort,
            page: PageQuery::new(filter.page, filter.limit),
            public_only,
        })
    }

    pub fn matches(&self, product: &Product) -> bool {
        let details = product.watch_details.as_ref();

        (!self.public_only || product.is_active)
            && self.category.is_none_or(|c| product.category_id == Some(c))
            && self.brand.is_none_or(|b| product.brand_id == Some(b))
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && self.min_rating.is_none_or(|min| product.ratings >= min)
            && (!self.in_stock || product.stock > 0)
            && self.featured.is_none_or(|f| product.featured == f)
            && self.is_best_seller.is_none_or(|f| product.is_best_seller == f)
            && self.is_new_arrival.is_none_or(|f| product.is_new_arrival == f)
            && self
                .gender
                .is_none_or(|g| details.is_some_and(|d| d.gender == g))
            && self
                .movement
                .is_none_or(|m| details.is_some_and(|d| d.movement == Some(m)))
            && (self.tags.is_empty() || product.tags.iter().any(|t| self.tags.contains(t)))
            && self.search.as_deref().is_none_or(|term| {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            })
    }
}

/// Curated product shelves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Highlight {
    TopRated,
    Featured,
    BestSellers,
    NewArrivals,
}

impl Highlight {
    pub fn limit(self) -> i64 {
        match self {
            Highlight::TopRated => 5,
            _ => 8,
        }
    }

    pub fn sort(self) -> SortKey {
        match self {
            Highlight::TopRated => SortKey {
                field: SortField::Ratings,
                descending: true,
            },
            _ => SortKey::NEWEST_FIRST,
        }
    }

    /// Active products on this shelf
    pub fn includes(self, product: &Product) -> bool {
        product.is_active
            && match self {
                Highlight::TopRated => true,
                Highlight::Featured => product.featured,
                Highlight::BestSellers => product.is_best_seller,
                Highlight::NewArrivals => product.is_new_arrival,
            }
    }
}

/// Steps of the quick search, tried in order until one finds something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SearchStage {
    NamePrefix,
    NameContains,
    DescriptionOrTags,
}

impl SearchStage {
    pub const CHAIN: [SearchStage; 3] = [
        SearchStage::NamePrefix,
        SearchStage::NameContains,
        SearchStage::DescriptionOrTags,
    ];

    /// Case-insensitive match of `term` against an active product
    pub fn matches(self, product: &Product, term: &str) -> bool {
        if !product.is_active {
            return false;
        }
        let term = term.to_lowercase();
        match self {
            SearchStage::NamePrefix => product.name.to_lowercase().starts_with(&term),
            SearchStage::NameContains => product.name.to_lowercase().contains(&term),
            SearchStage::DescriptionOrTags => {
                product.description.to_lowercase().contains(&term)
                    || product.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Text to look for
    pub q: Option<String>,
    /// At most 50, default 20
    pub limit: Option<i64>,
}
