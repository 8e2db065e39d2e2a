use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::build_message;
use crate::{Email, Mailer, MailerError};

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Unencrypted, for local relays such as mailpit.
    Plain,
    /// Upgrade with STARTTLS (`MAIL_USE_TLS`, usually port 587).
    StartTls,
    /// TLS from the first byte (`MAIL_USE_SSL`, usually port 465).
    ImplicitTls,
}

impl SmtpSecurity {
    /// SSL wins over TLS; TLS defaults to on when unset.
    pub fn from_flags(use_ssl: Option<bool>, use_tls: Option<bool>) -> Self {
        match (use_ssl, use_tls) {
            (Some(true), _) => Self::ImplicitTls,
            (_, Some(false)) => Self::Plain,
            _ => Self::StartTls,
        }
    }
}

/// Delivers mail through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpTransport {
    /// Credentials are only attached when both parts are present.
    pub fn connect(
        host: &str,
        port: u16,
        security: SmtpSecurity,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, MailerError> {
        let builder = match security {
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
        }
        .port(port);

        let builder = match (username, password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.to_owned(), pass.to_owned()))
            }
            _ => builder,
        };

        Ok(Self {
            relay: builder.build(),
            host: host.to_owned(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let recipients = email.to.len();
        let message = build_message(email)?;
        self.relay.send(message).await?;
        tracing::debug!(host = %self.host, recipients, "Email relayed over SMTP");
        Ok(())
    }
}
