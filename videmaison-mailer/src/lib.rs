//! Email delivery for the Vide Maison backend.
//!
//! The crate is split into three layers:
//!
//! - [`Email`] / [`EmailBuilder`]: a transport-agnostic message value
//! - [`Mailer`]: the transport seam, implemented by [`SmtpTransport`] and [`FileTransport`]
//! - [`templates`]: askama templates for the service-request emails, localized
//!   through [`Locale`]
//!
//! Delivery is best-effort from the caller's point of view: [`send_notification`]
//! logs failures and reports them as `false` instead of an error.

pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod templates;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use email_types::{
    AdminNewRequestEmail, RequestCancelledEmail, RequestCompletedEmail, RequestConfirmationEmail,
    RequestSummary,
};
pub use error::MailerError;
pub use mailer::{Mailer, send_notification};
pub use templates::Locale;
pub use transports::{FileTransport, SmtpSecurity, SmtpTransport};

pub mod prelude {
    pub use crate::{
        AdminNewRequestEmail, Email, EmailBuilder, FileTransport, Locale, Mailer, MailerConfig,
        MailerError, RequestCancelledEmail, RequestCompletedEmail, RequestConfirmationEmail,
        RequestSummary, SmtpTransport, send_notification,
    };
}
