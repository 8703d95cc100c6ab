//! Support Domain
//!
//! Customer-facing support flows: the contact form, newsletter subscriptions
//! and warranty registration with uploaded proof of purchase.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                   Handlers                    │  ← /contact, /newsletter, /warranty
//! └───────────────────────┬───────────────────────┘
//!                         │
//! ┌───────────────────────▼───────────────────────┐
//! │ ContactService NewsletterService WarrantySvc  │  ──► Mailer, ObjectStorage
//! └──────────┬────────────────────────┬───────────┘
//!            │                        │
//! ┌──────────▼──────────┐   ┌─────────▼─────────┐
//! │     Repository      │   │  WarrantyCatalog  │  ← implemented over the products domain
//! └──────────┬──────────┘   └───────────────────┘
//!            │
//! ┌──────────▼──────────┐
//! │       Models        │  ← Contact, Subscriber, Warranty
//! └─────────────────────┘
//! ```
//!
//! Outgoing mail for contact messages and welcome emails never fails the
//! request; newsletter broadcasts do.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{SupportError, SupportResult};
pub use handlers::ApiDoc;
pub use models::{
    Contact, ContactFilter, ContactStatus, CreateContact, RegisterWarranty, SendNewsletter,
    Subscribe, Subscriber, Subscription, UpdateWarranty, Warranty, WarrantyFilter,
    WarrantyStatus, MAX_WARRANTY_DOCUMENTS,
};
pub use mongodb::{MongoContactRepository, MongoSubscriberRepository, MongoWarrantyRepository};
pub use repository::{
    ContactRepository, InMemoryContactRepository, InMemorySubscriberRepository,
    InMemoryWarrantyCatalog, InMemoryWarrantyRepository, SubscriberRepository, WarrantyCatalog,
    WarrantyRepository,
};
pub use service::{ContactService, NewsletterService, WarrantyService};
