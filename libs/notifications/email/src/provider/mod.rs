//! Email provider implementations

pub mod mock;
pub mod smtp;

pub use mock::MockSmtpProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::EmailResult;
use crate::models::Email;
use async_trait::async_trait;

/// Result of sending an email
#[derive(Debug)]
pub struct SendResult {
    /// Provider-specific message ID
    pub message_id: String,
}

/// Delivery backend for [`Email`] messages.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &Email) -> EmailResult<SendResult>;

    async fn health_check(&self) -> EmailResult<()>;

    fn name(&self) -> &'static str;
}
