use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Email builder error: {0}")]
    Builder(String),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Message error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("File transport error: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MailerError::Builder("Subject is required".to_string());
        assert_eq!(err.to_string(), "Email builder error: Subject is required");

        let err = MailerError::Config("MAIL_PORT must be a number".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: MAIL_PORT must be a number"
        );
    }
}
