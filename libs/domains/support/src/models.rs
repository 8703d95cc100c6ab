use axum_helpers::{Actor, PageQuery};
use chrono::{DateTime, Months, Utc};
use database::mongodb::serde_helpers::{datetime, option_datetime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{SupportError, SupportResult};

/// Documents a single warranty may carry
pub const MAX_WARRANTY_DOCUMENTS: usize = 3;

// Contacts

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contact {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(input: CreateContact) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            subject: input.subject,
            message: input.message,
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateContact {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactStatus {
    pub status: ContactStatus,
}

/// Query parameters for listing contact messages
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactSubmitted {
    pub message: String,
    pub contact: Contact,
}

// Newsletter

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscriber {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub email: String,
    pub is_subscribed: bool,
    #[serde(with = "datetime")]
    pub subscribed_at: DateTime<Utc>,
    #[serde(default, with = "option_datetime")]
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub unsubscribe_token: String,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(email),
            is_subscribed: true,
            subscribed_at: now,
            unsubscribed_at: None,
            unsubscribe_token: unsubscribe_token(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn resubscribe(&mut self) {
        let now = Utc::now();
        self.is_subscribed = true;
        self.subscribed_at = now;
        self.unsubscribed_at = None;
        self.updated_at = now;
    }

    pub fn unsubscribe(&mut self) {
        let now = Utc::now();
        self.is_subscribed = false;
        self.unsubscribed_at = Some(now);
        self.updated_at = now;
    }
}

/// 32 lowercase hex characters
pub fn unsubscribe_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Subscribe {
    #[validate(email)]
    pub email: String,
}

/// What a subscribe request did
#[derive(Debug, Clone, PartialEq)]
pub enum Subscription {
    AlreadySubscribed(Subscriber),
    Resubscribed(Subscriber),
    Created(Subscriber),
}

impl Subscription {
    pub fn subscriber(&self) -> &Subscriber {
        match self {
            Self::AlreadySubscribed(s) | Self::Resubscribed(s) | Self::Created(s) => s,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadySubscribed(_) => "You are already subscribed to our newsletter",
            Self::Resubscribed(_) => "You have been resubscribed to our newsletter",
            Self::Created(_) => "Successfully subscribed to newsletter",
        }
    }
}

/// Public view of a subscription; the unsubscribe token only travels by email
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub message: String,
    pub email: String,
    pub is_subscribed: bool,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        let subscriber = subscription.subscriber();
        Self {
            message: subscription.message().to_string(),
            email: subscriber.email.clone(),
            is_subscribed: subscriber.is_subscribed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SendNewsletter {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    /// HTML body of the issue
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NewsletterSent {
    pub message: String,
    pub recipients: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Warranties

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarrantyStatus {
    #[default]
    Pending,
    Active,
    Expired,
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Warranty {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    /// Order number printed on the purchase receipt
    pub order_ref: String,
    pub serial_number: String,
    #[serde(with = "datetime")]
    pub purchase_date: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub status: WarrantyStatus,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Warranty {
    /// New pending warranty expiring `months` after the purchase
    pub fn register(user_id: Uuid, input: RegisterWarranty, months: u32) -> SupportResult<Self> {
        let now = Utc::now();
        if input.purchase_date > now {
            return Err(SupportError::Validation(
                "Purchase date cannot be in the future".to_string(),
            ));
        }

        let expiry_date = input
            .purchase_date
            .checked_add_months(Months::new(months))
            .ok_or_else(|| SupportError::Validation("Warranty period is out of range".to_string()))?;

        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            product_id: input.product_id,
            order_ref: input.order_ref.trim().to_string(),
            serial_number: input.serial_number.trim().to_string(),
            purchase_date: input.purchase_date,
            expiry_date,
            status: WarrantyStatus::Pending,
            documents: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Owners and admins may read and extend a warranty
    pub fn accessible_by(&self, actor: &Actor) -> bool {
        self.user_id == actor.id || actor.is_admin()
    }

    pub fn apply_update(&mut self, update: UpdateWarranty) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Utc::now();
    }

    pub fn remaining_document_slots(&self) -> usize {
        MAX_WARRANTY_DOCUMENTS.saturating_sub(self.documents.len())
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterWarranty {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub order_ref: String,
    #[validate(length(min = 1, max = 100))]
    pub serial_number: String,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateWarranty {
    pub status: Option<WarrantyStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query parameters for listing warranties
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct WarrantyFilter {
    pub status: Option<WarrantyStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl WarrantyFilter {
    pub fn page(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit)
    }
}

impl ContactFilter {
    pub fn page(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit)
    }
}
