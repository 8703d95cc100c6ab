use axum_helpers::{Actor, PageQuery, Role};
use chrono::{DateTime, Utc};
use database::mongodb::serde_helpers::datetime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

fn default_true() -> bool {
    true
}

/// Saved shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    /// Label such as "Home" or "Work"
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Stored lowercase
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Product ids
    #[serde(default)]
    pub wishlist: Vec<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user (password will be hashed by service layer)
    pub fn new(name: String, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            email: normalize_email(email),
            password_hash,
            role: Role::User,
            phone: None,
            profile_image: None,
            addresses: Vec::new(),
            wishlist: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn apply_profile(&mut self, update: UpdateProfile) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = normalize_email(&email);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        self.updated_at = Utc::now();
    }

    pub fn apply_admin_update(&mut self, update: AdminUpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = normalize_email(&email);
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }

    /// Add an address. The first address, or one flagged default, becomes the only default.
    pub fn add_address(&mut self, input: AddressInput) {
        let is_default = input.is_default.unwrap_or(false) || self.addresses.is_empty();
        if is_default {
            self.clear_default_address();
        }

        self.addresses.push(Address {
            id: Uuid::now_v7(),
            name: input.name,
            is_default,
            street: input.street,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            country: input.country,
            phone_number: input.phone_number,
        });
        self.updated_at = Utc::now();
    }

    pub fn update_address(&mut self, address_id: Uuid, update: UpdateAddress) -> UserResult<()> {
        let index = self.address_index(address_id)?;

        if update.is_default == Some(true) {
            self.clear_default_address();
        }

        let address = &mut self.addresses[index];
        if let Some(name) = update.name {
            address.name = name;
        }
        if let Some(street) = update.street {
            address.street = street;
        }
        if let Some(city) = update.city {
            address.city = city;
        }
        if let Some(state) = update.state {
            address.state = state;
        }
        if let Some(zip_code) = update.zip_code {
            address.zip_code = zip_code;
        }
        if let Some(country) = update.country {
            address.country = country;
        }
        if let Some(phone_number) = update.phone_number {
            address.phone_number = Some(phone_number);
        }
        if update.is_default == Some(true) {
            address.is_default = true;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove an address; if it was the default the first remaining one takes over
    pub fn remove_address(&mut self, address_id: Uuid) -> UserResult<()> {
        let index = self.address_index(address_id)?;
        let removed = self.addresses.remove(index);

        if removed.is_default {
            if let Some(first) = self.addresses.first_mut() {
                first.is_default = true;
            }
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_default_address(&mut self, address_id: Uuid) -> UserResult<()> {
        let index = self.address_index(address_id)?;
        self.clear_default_address();
        self.addresses[index].is_default = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns false when the product was already listed
    pub fn add_to_wishlist(&mut self, product_id: Uuid) -> bool {
        if self.wishlist.contains(&product_id) {
            return false;
        }
        self.wishlist.push(product_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_from_wishlist(&mut self, product_id: Uuid) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|id| *id != product_id);
        let removed = self.wishlist.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    fn address_index(&self, address_id: Uuid) -> UserResult<usize> {
        self.addresses
            .iter()
            .position(|a| a.id == address_id)
            .ok_or(UserError::AddressNotFound)
    }

    fn clear_default_address(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub addresses: Vec<Address>,
    pub wishlist: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            profile_image: user.profile_image,
            addresses: user.addresses,
            wishlist: user.wishlist,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Identity returned alongside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Response after successful login/register
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

/// DTO for user registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AdminUpdateUser {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub is_default: Option<bool>,
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAddress {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub is_default: Option<bool>,
    #[validate(length(min = 1, max = 200))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    pub role: Option<Role>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A [`UserFilter`] with its paging normalized
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
    pub page: PageQuery,
}

impl From<UserFilter> for UserQuery {
    fn from(filter: UserFilter) -> Self {
        Self {
            role: filter.role,
            search: filter
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page: PageQuery::new(filter.page, filter.limit),
        }
    }
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|role| user.role == role)
            && self.search.as_deref().is_none_or(|term| {
                let term = term.to_lowercase();
                user.name.to_lowercase().contains(&term) || user.email.contains(&term)
            })
    }
}
