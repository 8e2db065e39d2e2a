use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::Transport;
use lettre::transport::file::FileTransport as LettreFileTransport;
use std::path::{Path, PathBuf};

use super::build_message;

/// Writes every message as an `.eml` file instead of delivering it.
///
/// Used for local development when no SMTP server is configured.
#[derive(Debug, Clone)]
pub struct FileTransport {
    transport: LettreFileTransport,
    output_dir: PathBuf,
}

impl FileTransport {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, MailerError> {
        let output_dir = output_dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            transport: LettreFileTransport::new(&output_dir),
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Mailer for FileTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let subject = email.subject.clone();
        let message = build_message(email)?;

        // lettre's file transport is blocking
        let transport = self.transport.clone();
        let file_id = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailerError::Io(std::io::Error::other(e)))??;

        tracing::info!(
            dir = %self.output_dir.display(),
            file = %file_id,
            subject = %subject,
            "Email written to disk"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_transport_writes_eml() {
        let dir = std::env::temp_dir().join(format!(
            "videmaison-mailer-test-{}",
            std::process::id()
        ));
        let transport = FileTransport::new(&dir).unwrap();

        let email = Email::builder()
            .from("noreply@videmaison.be")
            .to("client@example.com")
            .subject("Confirmation")
            .text_body("Merci pour votre demande")
            .build()
            .unwrap();

        transport.send_email(email).await.unwrap();

        let written = std::fs::read_dir(transport.output_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "eml"))
            .count();
        assert!(written >= 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
