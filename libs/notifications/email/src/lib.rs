//! Transactional email for the shop: cart recovery reminders, newsletter mail and
//! contact form notifications.
//!
//! ## Components
//!
//! - **Model**: [`Email`], a single message with optional BCC fan-out
//! - **Providers**: [`SmtpProvider`] (lettre) and [`MockSmtpProvider`] for tests
//! - **Templates**: handlebars [`TemplateEngine`] preloaded with the shop's templates
//! - **Mailer**: [`Mailer`] renders a template and hands the result to a provider
//!
//! ```ignore
//! use email::{Mailer, SmtpProvider, TemplateEngine};
//!
//! let mailer = Mailer::new(Arc::new(SmtpProvider::mailhog()?), TemplateEngine::new()?);
//! mailer
//!     .send_template("jane@example.com", "newsletter_welcome", &json!({ "unsubscribe_url": url }))
//!     .await?;
//! ```

pub mod error;
pub mod mailer;
pub mod models;
pub mod provider;
pub mod templates;

pub use error::{EmailError, EmailResult};
pub use mailer::Mailer;
pub use models::Email;
pub use provider::{EmailProvider, MockSmtpProvider, SendResult, SmtpConfig, SmtpProvider};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
