use async_trait::async_trait;

use crate::{Email, MailerError};

/// Outbound transport seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}

/// Builds and sends a single-recipient message, reporting success as a bool.
///
/// Failures are logged and swallowed so callers can treat email as best-effort.
pub async fn send_notification(
    mailer: &dyn Mailer,
    from: &str,
    subject: &str,
    body: &str,
    recipient: &str,
    html: Option<&str>,
) -> bool {
    let mut builder = Email::builder()
        .from(from)
        .to(recipient)
        .subject(subject)
        .text_body(body);
    if let Some(html) = html {
        builder = builder.html_body(html);
    }

    let result = match builder.build() {
        Ok(email) => mailer.send_email(email).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, recipient = %recipient, subject = %subject, "Error sending email");
            false
        }
    }
}
