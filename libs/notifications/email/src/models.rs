use serde::{Deserialize, Serialize};

/// A message ready to hand to an [`EmailProvider`](crate::EmailProvider).
///
/// `to` may be empty when every recipient is in `bcc` (newsletter batches); the
/// provider then addresses the message to the sender itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub reply_to: Option<String>,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            to: vec![to.into()],
            bcc: Vec::new(),
            subject: subject.into(),
            body_text: None,
            body_html: None,
            reply_to: None,
        }
    }

    /// A message whose recipients must not see each other.
    pub fn broadcast(subject: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            to: Vec::new(),
            bcc: recipients,
            ..Self::new(String::new(), subject)
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Every address the message will be delivered to.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to.iter().chain(self.bcc.iter()).map(String::as_str)
    }

    pub fn is_addressed_to(&self, address: &str) -> bool {
        self.recipients().any(|r| r.eq_ignore_ascii_case(address))
    }
}
