use serde::{Deserialize, Serialize};

use crate::MailerError;

/// A single outbound message.
///
/// At least one body part is present. With both, transports send a
/// `multipart/alternative` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    pub fn has_body(&self) -> bool {
        let filled = |part: &Option<String>| part.as_deref().is_some_and(|b| !b.is_empty());
        filled(&self.html_body) || filled(&self.text_body)
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Vec<String>,
    from: Option<String>,
    subject: Option<String>,
    html_body: Option<String>,
    text_body: Option<String>,
}

impl EmailBuilder {
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    pub fn from(mut self, sender: impl Into<String>) -> Self {
        self.from = Some(sender.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into()).filter(|h| !h.is_empty());
        self
    }

    /// Empty text is dropped, so an HTML-only notification stays single-part.
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into()).filter(|t| !t.is_empty());
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        let missing = |what: &str| MailerError::Builder(format!("{what} is required"));

        if self.to.iter().all(|r| r.trim().is_empty()) {
            return Err(missing("Recipient"));
        }
        let from = self.from.filter(|f| !f.is_empty()).ok_or_else(|| missing("From address"))?;
        let subject = self
            .subject
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("Subject"))?;

        let email = Email {
            to: self.to,
            from,
            subject,
            html_body: self.html_body,
            text_body: self.text_body,
        };

        if !email.has_body() {
            return Err(missing("Email body"));
        }
        Ok(email)
    }
}
