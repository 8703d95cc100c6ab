//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::error::{EmailError, EmailResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{env_optional, env_or_default, env_parse, env_required, ConfigError, FromEnv};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

/// SMTP provider configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from_email", &self.from_email)
            .field("use_tls", &self.use_tls)
            .finish_non_exhaustive()
    }
}

impl FromEnv for SmtpConfig {
    /// `SMTP_HOST` and `EMAIL_FROM_ADDRESS` are required; `SMTP_PORT` defaults to 587
    /// and `SMTP_USE_TLS` to true.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse("SMTP_PORT", 587u16)?,
            username: env_optional("SMTP_USERNAME").unwrap_or_default(),
            password: env_optional("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env_required("EMAIL_FROM_ADDRESS")?,
            from_name: env_or_default("EMAIL_FROM_NAME", "Tornado Watches"),
            use_tls: env_parse("SMTP_USE_TLS", true)?,
        })
    }
}

impl SmtpConfig {
    /// Local Mailhog/Mailpit on `localhost:1025` without authentication.
    pub fn mailhog() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", 1025u16)?,
            username: String::new(),
            password: String::new(),
            from_email: env_or_default("EMAIL_FROM_ADDRESS", "noreply@localhost"),
            from_name: env_or_default("EMAIL_FROM_NAME", "Tornado Watches"),
            use_tls: false,
        })
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> EmailResult<Self> {
        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| EmailError::Config(format!("Failed to create SMTP relay: {e}")))?
                .credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
                .port(config.port)
                .build()
        } else if !config.username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
                .port(config.port)
                .build()
        } else {
            // Mailhog/Mailpit accept unauthenticated plaintext
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        };

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    pub fn mailhog() -> EmailResult<Self> {
        Self::new(SmtpConfig::mailhog()?)
    }

    pub fn from_env() -> EmailResult<Self> {
        Self::new(SmtpConfig::from_env()?)
    }

    fn build_message(&self, email: &Email) -> EmailResult<Message> {
        let from = parse_mailbox(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))?;

        let mut builder = Message::builder().from(from.clone()).subject(&email.subject);

        if email.to.is_empty() {
            builder = builder.to(from);
        }
        for to in &email.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for bcc in &email.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
            (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
            (None, None) => {
                return Err(EmailError::InvalidMessage(
                    "Email must have either text or HTML body".to_string(),
                ));
            }
        };

        message.map_err(|e| EmailError::InvalidMessage(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> EmailResult<Mailbox> {
    address.parse().map_err(|e: lettre::address::AddressError| EmailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> EmailResult<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::Provider(e.to_string()))?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            recipients = email.recipients().count(),
            subject = %email.subject,
            "Email sent"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> EmailResult<()> {
        let reachable = self
            .transport
            .test_connection()
            .await
            .map_err(|e| EmailError::Provider(e.to_string()))?;

        if reachable {
            Ok(())
        } else {
            Err(EmailError::Provider("SMTP server did not answer".to_string()))
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SmtpProvider {
        SmtpProvider::new(SmtpConfig {
            host: "localhost".into(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            from_email: "shop@tornado.test".into(),
            from_name: "Tornado Watches".into(),
            use_tls: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_message_with_both_bodies() {
        let email = Email::new("jane@example.com", "Hello")
            .with_text("plain")
            .with_html("<p>html</p>");
        assert!(provider().build_message(&email).is_ok());
    }

    #[tokio::test]
    async fn test_build_message_requires_body() {
        let email = Email::new("jane@example.com", "Hello");
        assert!(matches!(
            provider().build_message(&email),
            Err(EmailError::InvalidMessage(_))
        ));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_address() {
        let email = Email::new("not an address", "Hello").with_text("x");
        assert!(matches!(
            provider().build_message(&email),
            Err(EmailError::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn test_broadcast_is_addressed_to_sender() {
        let email = Email::broadcast("News", vec!["a@example.com".into()]).with_html("<p>x</p>");
        let message = provider().build_message(&email).unwrap();
        let to = message.headers().get_raw("To").unwrap_or_default();
        assert!(to.contains("shop@tornado.test"));
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", None),
                ("EMAIL_FROM_ADDRESS", Some("shop@example.com")),
                ("SMTP_USE_TLS", Some("false")),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.port, 587);
                assert!(!config.use_tls);
                assert_eq!(config.from_name, "Tornado Watches");
            },
        );
    }

    #[test]
    fn test_config_requires_host() {
        temp_env::with_var_unset("SMTP_HOST", || {
            assert!(SmtpConfig::from_env().is_err());
        });
    }
}
