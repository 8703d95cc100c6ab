//! Content Domain
//!
//! Editorial content for the storefront: journal posts with reader comments,
//! customer testimonials and FAQs grouped by category.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                  Handlers                  │  ← /blogs, /testimonials, /faqs
//! └─────────────────────┬──────────────────────┘
//!                       │
//! ┌─────────────────────▼──────────────────────┐
//! │ BlogService TestimonialService FaqService  │  ← Visibility, images ──► ObjectStorage
//! └─────────────────────┬──────────────────────┘
//!                       │
//! ┌─────────────────────▼──────────────────────┐
//! │                 Repository                 │  ← In-memory or MongoDB
//! └─────────────────────┬──────────────────────┘
//!                       │
//! ┌─────────────────────▼──────────────────────┐
//! │                   Models                   │  ← Blog, Comment, Testimonial, Faq
//! └────────────────────────────────────────────┘
//! ```
//!
//! Drafts, unapproved testimonials and inactive FAQs are visible to admins only.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ContentError, ContentResult};
pub use handlers::ApiDoc;
pub use models::{
    Blog, BlogFilter, Comment, CreateBlog, CreateComment, CreateFaq, CreateTestimonial, Faq,
    FaqCategory, Testimonial, UpdateBlog, UpdateFaq, UpdateTestimonial, FEATURED_TESTIMONIALS,
};
pub use mongodb::{MongoBlogRepository, MongoFaqRepository, MongoTestimonialRepository};
pub use repository::{
    BlogRepository, FaqRepository, InMemoryBlogRepository, InMemoryFaqRepository,
    InMemoryTestimonialRepository, TestimonialRepository,
};
pub use service::{BlogService, FaqService, TestimonialService};
