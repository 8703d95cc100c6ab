use crate::error::EmailResult;
use crate::models::Email;
use crate::provider::{EmailProvider, SendResult};
use crate::templates::{RenderedTemplate, TemplateEngine};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Recipients per message when fanning out over BCC.
pub const BCC_BATCH_SIZE: usize = 50;

/// Renders shop templates and delivers them through one provider.
///
/// Cheap to clone; domain services hold one each.
#[derive(Clone)]
pub struct Mailer {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
}

impl Mailer {
    pub fn new(provider: Arc<dyn EmailProvider>, templates: TemplateEngine) -> Self {
        Self {
            provider,
            templates: Arc::new(templates),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn send(&self, email: &Email) -> EmailResult<SendResult> {
        self.provider.send(email).await
    }

    /// Render `template` with `data` and send it to a single address.
    #[instrument(skip(self, data))]
    pub async fn send_template<T: Serialize>(
        &self,
        to: &str,
        template: &str,
        data: &T,
    ) -> EmailResult<SendResult> {
        let rendered = self.templates.render(template, data)?;
        let email = apply(Email::new(to, rendered.subject.clone()), rendered);
        self.provider.send(&email).await
    }

    /// Render `template` once and send it to `recipients` in BCC batches of
    /// [`BCC_BATCH_SIZE`]. Returns the number of recipients addressed.
    #[instrument(skip(self, recipients, data), fields(recipients = recipients.len()))]
    pub async fn broadcast_template<T: Serialize>(
        &self,
        recipients: &[String],
        template: &str,
        data: &T,
    ) -> EmailResult<usize> {
        let rendered = self.templates.render(template, data)?;

        for batch in recipients.chunks(BCC_BATCH_SIZE) {
            let email = apply(
                Email::broadcast(rendered.subject.clone(), batch.to_vec()),
                rendered.clone(),
            );
            self.provider.send(&email).await?;
        }

        tracing::info!(recipients = recipients.len(), template, "Broadcast sent");
        Ok(recipients.len())
    }

    pub async fn health_check(&self) -> EmailResult<()> {
        self.provider.health_check().await
    }
}

fn apply(mut email: Email, rendered: RenderedTemplate) -> Email {
    email.body_text = rendered.body_text;
    email.body_html = rendered.body_html;
    email
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockSmtpProvider;
    use serde_json::json;

    fn mailer(provider: &MockSmtpProvider) -> Mailer {
        Mailer::new(Arc::new(provider.clone()), TemplateEngine::new().unwrap())
    }

    #[tokio::test]
    async fn test_send_template_renders_subject_and_bodies() {
        let provider = MockSmtpProvider::new();
        mailer(&provider)
            .send_template(
                "jane@example.com",
                "newsletter_welcome",
                &json!({ "unsubscribe_url": "http://localhost:3000/newsletter/unsubscribe/abc" }),
            )
            .await
            .unwrap();

        let sent = provider.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Welcome to Tornado Watches Newsletter");
        assert!(sent[0].body_text.as_ref().unwrap().contains("/newsletter/unsubscribe/abc"));
    }

    #[tokio::test]
    async fn test_broadcast_batches_by_fifty() {
        let provider = MockSmtpProvider::new();
        let recipients: Vec<String> = (0..120).map(|i| format!("reader{i}@example.com")).collect();

        let count = mailer(&provider)
            .broadcast_template(
                &recipients,
                "newsletter_issue",
                &json!({ "subject": "New arrivals", "content": "<p>Hi</p>" }),
            )
            .await
            .unwrap();

        assert_eq!(count, 120);
        let sent = provider.sent_emails().await;
        let sizes: Vec<usize> = sent.iter().map(|e| e.bcc.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(sent.iter().all(|e| e.to.is_empty()));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = MockSmtpProvider::failing("relay refused");
        let mailer = Mailer::new(Arc::new(provider), TemplateEngine::new().unwrap());

        let result = mailer
            .send_template("a@example.com", "contact_ack", &json!({ "name": "A", "subject": "B" }))
            .await;
        assert!(result.is_err());
    }
}
