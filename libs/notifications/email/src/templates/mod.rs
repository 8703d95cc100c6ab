//! Handlebars templates for every message the shop sends.
//!
//! Each template has a subject, a plain text body and an HTML body. Only the HTML body
//! is escaped. Money values are passed as integer cents and formatted with the `money`
//! helper: `{{money total}}`.

use crate::error::{EmailError, EmailResult};
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;
use std::collections::HashMap;

/// Output of [`TemplateEngine::render`]
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Format integer cents as dollars: 17250 -> "$172.50".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

handlebars_helper!(money: |cents: i64| format_cents(cents));

pub struct TemplateEngine {
    /// Subjects and text bodies
    plain: Handlebars<'static>,
    html: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

fn registry(escape: bool) -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_helper("money", Box::new(money));
    if !escape {
        handlebars.register_escape_fn(no_escape);
    }
    handlebars
}

impl TemplateEngine {
    /// Engine with the shop templates registered.
    pub fn new() -> EmailResult<Self> {
        let mut engine = Self::empty();
        for template in default_templates() {
            engine.register(template)?;
        }
        Ok(engine)
    }

    /// Engine with only the helpers registered.
    pub fn empty() -> Self {
        Self {
            plain: registry(false),
            html: registry(true),
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, template: EmailTemplate) -> EmailResult<()> {
        self.plain
            .register_template_string(&format!("{}_subject", template.name), &template.subject)?;
        if let Some(text) = &template.body_text {
            self.plain
                .register_template_string(&format!("{}_text", template.name), text)?;
        }
        if let Some(html) = &template.body_html {
            self.html
                .register_template_string(&format!("{}_html", template.name), html)?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> EmailResult<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| EmailError::TemplateNotFound(name.to_string()))?;

        let subject = self.plain.render(&format!("{name}_subject"), data)?;
        let body_text = template
            .body_text
            .as_ref()
            .map(|_| self.plain.render(&format!("{name}_text"), data))
            .transpose()?;
        let body_html = template
            .body_html
            .as_ref()
            .map(|_| self.html.render(&format!("{name}_html"), data))
            .transpose()?;

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

const LAYOUT_OPEN: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #222; max-width: 600px; margin: 0 auto;">
<h2 style="color: #111; border-bottom: 2px solid #c9a227; padding-bottom: 8px;">Tornado Watches</h2>
"#;
const LAYOUT_CLOSE: &str = "\n</body>\n</html>";

fn html(body: &str) -> Option<String> {
    Some(format!("{LAYOUT_OPEN}{body}{LAYOUT_CLOSE}"))
}

fn default_templates() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            name: "cart_recovery".to_string(),
            subject: "{{name}}, you left something in your cart".to_string(),
            body_text: Some(
                r#"Hello {{name}},

You still have these items waiting in your cart:
{{#each items}}
- {{this.name}} x {{this.quantity}}: {{money this.line_total}}
{{/each}}
Total: {{money total}}

Complete your purchase: {{cart_url}}

The Tornado Watches Team"#
                    .to_string(),
            ),
            body_html: html(
                r#"<p>Hello {{name}},</p>
<p>You still have these items waiting in your cart:</p>
<table style="width: 100%; border-collapse: collapse;">
{{#each items}}
<tr>
  <td style="padding: 4px 0;">{{this.name}}</td>
  <td style="padding: 4px 0; text-align: center;">&times; {{this.quantity}}</td>
  <td style="padding: 4px 0; text-align: right;">{{money this.line_total}}</td>
</tr>
{{/each}}
</table>
<p style="font-weight: bold;">Total: {{money total}}</p>
<p><a href="{{cart_url}}" style="background: #111; color: #fff; padding: 10px 18px; text-decoration: none;">Return to your cart</a></p>"#,
            ),
        },
        EmailTemplate {
            name: "newsletter_welcome".to_string(),
            subject: "Welcome to Tornado Watches Newsletter".to_string(),
            body_text: Some(
                r#"Thank you for subscribing to our newsletter! You'll now receive updates about our latest products and offers.

If you wish to unsubscribe, please click this link: {{unsubscribe_url}}"#
                    .to_string(),
            ),
            body_html: html(
                r#"<p>Thank you for subscribing to our newsletter! You'll now receive updates about our latest products and offers.</p>
<p style="font-size: 12px; color: #777;">Don't want these emails? <a href="{{unsubscribe_url}}">Unsubscribe</a>.</p>"#,
            ),
        },
        EmailTemplate {
            name: "newsletter_issue".to_string(),
            subject: "{{subject}}".to_string(),
            body_text: None,
            // Content is authored by an admin and sent as-is.
            body_html: html("{{{content}}}"),
        },
        EmailTemplate {
            name: "contact_admin".to_string(),
            subject: "New contact form submission: {{subject}}".to_string(),
            body_text: Some(
                r#"Name: {{name}}
Email: {{email}}
Phone: {{#if phone}}{{phone}}{{else}}Not provided{{/if}}
Subject: {{subject}}

{{message}}"#
                    .to_string(),
            ),
            body_html: html(
                r#"<h3>New contact form submission</h3>
<p><strong>Name:</strong> {{name}}<br>
<strong>Email:</strong> {{email}}<br>
<strong>Phone:</strong> {{#if phone}}{{phone}}{{else}}Not provided{{/if}}<br>
<strong>Subject:</strong> {{subject}}</p>
<p style="white-space: pre-wrap;">{{message}}</p>"#,
            ),
        },
        EmailTemplate {
            name: "contact_ack".to_string(),
            subject: "We received your message".to_string(),
            body_text: Some(
                r#"Hello {{name}},

Thank you for contacting Tornado Watches. We have received your message about "{{subject}}" and will get back to you as soon as possible.

The Tornado Watches Team"#
                    .to_string(),
            ),
            body_html: html(
                r#"<p>Hello {{name}},</p>
<p>Thank you for contacting Tornado Watches. We have received your message about &ldquo;{{subject}}&rdquo; and will get back to you as soon as possible.</p>
<p>The Tornado Watches Team</p>"#,
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shop_templates_registered() {
        let engine = TemplateEngine::new().unwrap();
        for name in [
            "cart_recovery",
            "newsletter_welcome",
            "newsletter_issue",
            "contact_admin",
            "contact_ack",
        ] {
            assert!(engine.has_template(name), "missing {name}");
        }
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(17250), "$172.50");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(-1000), "-$10.00");
    }

    #[test]
    fn test_cart_recovery_lists_items() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(
                "cart_recovery",
                &json!({
                    "name": "Jane",
                    "items": [
                        { "name": "Diver 300", "quantity": 2, "line_total": 50000 },
                        { "name": "Strap", "quantity": 1, "line_total": 1999 }
                    ],
                    "total": 51999,
                    "cart_url": "http://localhost:3000/cart"
                }),
            )
            .unwrap();

        assert_eq!(rendered.subject, "Jane, you left something in your cart");
        let text = rendered.body_text.unwrap();
        assert!(text.contains("Diver 300 x 2: $500.00"));
        assert!(text.contains("Total: $519.99"));
        assert!(rendered.body_html.unwrap().contains("http://localhost:3000/cart"));
    }

    #[test]
    fn test_newsletter_issue_keeps_html() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(
                "newsletter_issue",
                &json!({ "subject": "Spring sale", "content": "<h1>20% off</h1>" }),
            )
            .unwrap();

        assert_eq!(rendered.subject, "Spring sale");
        assert!(rendered.body_text.is_none());
        assert!(rendered.body_html.unwrap().contains("<h1>20% off</h1>"));
    }

    #[test]
    fn test_contact_admin_without_phone() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(
                "contact_admin",
                &json!({
                    "name": "Sam",
                    "email": "sam@example.com",
                    "phone": null,
                    "subject": "Strap sizing",
                    "message": "Does it fit a 17cm wrist?"
                }),
            )
            .unwrap();

        assert!(rendered.body_text.unwrap().contains("Phone: Not provided"));
    }

    #[test]
    fn test_plain_parts_are_not_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render("contact_ack", &json!({ "name": "Dana O'Brien", "subject": "Straps & bands" }))
            .unwrap();

        assert!(rendered.body_text.unwrap().contains("Dana O'Brien"));
        assert!(rendered.body_html.unwrap().contains("Straps &amp; bands"));
    }

    #[test]
    fn test_strict_mode_rejects_missing_fields() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("contact_ack", &json!({ "name": "Sam" })).unwrap_err();
        assert!(matches!(err, EmailError::Template(_)));
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::empty();
        assert!(matches!(
            engine.render("welcome", &json!({})),
            Err(EmailError::TemplateNotFound(_))
        ));
    }
}
