mod file;
pub mod smtp;

pub use file::FileTransport;
pub use smtp::{SmtpSecurity, SmtpTransport};

use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

use crate::{Email, MailerError};

/// Converts an [`Email`] into a lettre message.
///
/// Both bodies present yields `multipart/alternative` (plain first, HTML second).
pub(crate) fn build_message(email: Email) -> Result<Message, MailerError> {
    let mut message_builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject);

    for to in email.to {
        message_builder = message_builder.to(to.parse()?);
    }

    let message = match (email.text_body, email.html_body) {
        (Some(text), Some(html)) => message_builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text))
                .singlepart(SinglePart::html(html)),
        )?,
        (None, Some(html)) => message_builder.singlepart(SinglePart::html(html))?,
        (Some(text), None) => message_builder.singlepart(SinglePart::plain(text))?,
        (None, None) => {
            return Err(MailerError::Builder("No email body provided".to_string()));
        }
    };

    Ok(message)
}
