//! Outbound notification and template rendering collaborators.
//!
//! Delivery is fire-and-forget from the caller's side: a failed send is
//! logged and never undoes the work that triggered it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

pub trait Notifier: Send + Sync {
    fn send_email(&self, email: &OutboundEmail) -> Result<(), NotifyError>;
}

/// Flat key/value context handed to a template.
pub type TemplateContext = BTreeMap<&'static str, String>;

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn send_email(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        (**self).send_email(email)
    }
}

impl<T> TemplateRenderer for Arc<T>
where
    T: TemplateRenderer + ?Sized,
{
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, NotifyError> {
        (**self).render(template, context)
    }
}

/// Dev notifier: writes the email to the log instead of a mail server.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send_email(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        info!(
            recipient = %email.recipient,
            subject = %email.subject,
            is_html = email.is_html,
            body_len = email.body.len(),
            "email dispatched"
        );
        Ok(())
    }
}

/// Records sent emails; optionally refuses every send.
#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    sent: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for InMemoryOutbox {
    fn send_email(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("outbox refuses delivery".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("outbox lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

pub const BOOKING_CONFIRMATION: &str = "booking-confirmation";

const BOOKING_CONFIRMATION_HTML: &str = r#"<html><body>
<h2>Booking confirmation</h2>
<p>Hello {{customerName}},</p>
<p>Your booking for <strong>{{resourceName}}</strong> {{resourceLocation}} on {{date}} was received.</p>
<pre>{{slots}}</pre>
<p>{{totalSlots}} slot(s) at {{pricePerSlot}} each, total <strong>{{totalAmount}}</strong>.</p>
<p><a href="{{paymentLink}}">Complete payment</a></p>
<p>Order #{{orderId}}</p>
</body></html>"#;

#[derive(Debug, Clone)]
struct Template {
    body: String,
    html: bool,
}

/// Replaces `{{key}}` with the context value; unknown keys render empty.
///
/// Values substituted into HTML templates are escaped.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRenderer {
    templates: BTreeMap<String, Template>,
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self::default().with_html_template(BOOKING_CONFIRMATION, BOOKING_CONFIRMATION_HTML)
    }

    /// Plain-text template; values are inserted verbatim.
    pub fn with_template(self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.register(name.into(), body.into(), false)
    }

    pub fn with_html_template(self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.register(name.into(), body.into(), true)
    }

    fn register(mut self, name: String, body: String, html: bool) -> Self {
        self.templates.insert(name, Template { body, html });
        self
    }
}

fn escape_html(raw: &str, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, NotifyError> {
        let template = self
            .templates
            .get(template)
            .ok_or_else(|| NotifyError::UnknownTemplate(template.to_string()))?;

        let mut out = String::with_capacity(template.body.len());
        let mut rest = template.body.as_str();
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = after[..close].trim();
                    match context.get(key) {
                        Some(value) if template.html => escape_html(value, &mut out),
                        Some(value) => out.push_str(value),
                        None => {}
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholders_and_blanks_unknown_keys() {
        let r = PlaceholderRenderer::default().with_template("t", "Hi {{ name }}, {{missing}}!{{");
        let ctx = TemplateContext::from([("name", "Ana".to_string())]);
        assert_eq!(r.render("t", &ctx).unwrap(), "Hi Ana, !{{");
    }

    #[test]
    fn html_templates_escape_values() {
        let r = PlaceholderRenderer::default()
            .with_html_template("h", "<p>{{name}}</p><a href=\"{{link}}\">pay</a>")
            .with_template("t", "{{name}}");
        let ctx = TemplateContext::from([
            ("name", "<b>O'Hara & Co</b>".to_string()),
            ("link", "/pay?order=1&amount=30.00\" onclick=\"x".to_string()),
        ]);

        assert_eq!(
            r.render("h", &ctx).unwrap(),
            "<p>&lt;b&gt;O&#39;Hara &amp; Co&lt;/b&gt;</p>\
             <a href=\"/pay?order=1&amp;amount=30.00&quot; onclick=&quot;x\">pay</a>"
        );
        assert_eq!(r.render("t", &ctx).unwrap(), "<b>O'Hara & Co</b>");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = PlaceholderRenderer::new()
            .render("nope", &TemplateContext::new())
            .unwrap_err();
        assert_eq!(err, NotifyError::UnknownTemplate("nope".into()));
    }

    #[test]
    fn outbox_records_or_refuses() {
        let email = OutboundEmail {
            recipient: "c@example.com".into(),
            subject: "s".into(),
            body: "b".into(),
            is_html: false,
        };
        let ok = InMemoryOutbox::new();
        ok.send_email(&email).unwrap();
        assert_eq!(ok.sent(), vec![email.clone()]);

        assert!(InMemoryOutbox::failing().send_email(&email).is_err());
    }
}
