use async_trait::async_trait;

use crate::{Error, ServiceRequest};

/// Outbound email for the service-request workflow.
///
/// Callers treat every method as best-effort: a returned error is logged, never
/// surfaced to the client.
#[async_trait]
pub trait MailerService: Send + Sync + 'static {
    /// French notification to the configured admin address.
    async fn send_new_request_notification(&self, request: &ServiceRequest) -> Result<(), Error>;

    /// Localized confirmation to the customer.
    async fn send_request_confirmation(&self, request: &ServiceRequest) -> Result<(), Error>;

    async fn send_request_completed(&self, request: &ServiceRequest) -> Result<(), Error>;

    /// Uses the request's admin notes as the cancellation reason.
    async fn send_request_cancelled(&self, request: &ServiceRequest) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailerService;

#[async_trait]
impl MailerService for NoopMailerService {
    async fn send_new_request_notification(&self, _request: &ServiceRequest) -> Result<(), Error> {
        Ok(())
    }

    async fn send_request_confirmation(&self, _request: &ServiceRequest) -> Result<(), Error> {
        Ok(())
    }

    async fn send_request_completed(&self, _request: &ServiceRequest) -> Result<(), Error> {
        Ok(())
    }

    async fn send_request_cancelled(&self, _request: &ServiceRequest) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(feature = "mailer")]
pub use self::mailer_impl::*;

#[cfg(feature = "mailer")]
mod mailer_impl {
    use async_trait::async_trait;
    use videmaison_mailer::prelude::*;

    use super::MailerService;
    use crate::{Error, ServiceRequest};

    fn delivery_error(e: MailerError) -> Error {
        Error::Delivery(e.to_string())
    }

    pub struct VideMaisonMailerService {
        transport: Box<dyn Mailer>,
        config: MailerConfig,
    }

    impl VideMaisonMailerService {
        pub fn new(config: MailerConfig) -> Result<Self, Error> {
            let transport = config.build_transport().map_err(delivery_error)?;
            Ok(Self { transport, config })
        }

        pub fn from_env() -> Result<Self, Error> {
            Self::new(MailerConfig::from_env().map_err(delivery_error)?)
        }

        /// Uses an already-built transport, e.g. a recording mailer in tests.
        pub fn with_transport(config: MailerConfig, transport: Box<dyn Mailer>) -> Self {
            Self { transport, config }
        }

        pub fn config(&self) -> &MailerConfig {
            &self.config
        }

        fn summary(request: &ServiceRequest) -> RequestSummary {
            RequestSummary {
                name: request.name.clone(),
                email: request.email.clone(),
                phone: request.phone.clone(),
                address: request.address.clone(),
                service_name: request.service_type_name().to_string(),
                message: request.message.clone(),
                language: request.language.clone(),
                submitted_at: request.created_at,
            }
        }

        /// Every workflow email has a single recipient.
        async fn send(&self, email: Email) -> Result<(), Error> {
            let recipient = email.to.first().map(String::as_str).unwrap_or_default();
            let delivered = send_notification(
                self.transport.as_ref(),
                &email.from,
                &email.subject,
                email.text_body.as_deref().unwrap_or_default(),
                recipient,
                email.html_body.as_deref(),
            )
            .await;

            if delivered {
                Ok(())
            } else {
                Err(Error::Delivery(format!(
                    "Email \"{}\" to {recipient} was not delivered",
                    email.subject
                )))
            }
        }
    }

    #[async_trait]
    impl MailerService for VideMaisonMailerService {
        async fn send_new_request_notification(
            &self,
            request: &ServiceRequest,
        ) -> Result<(), Error> {
            let email = AdminNewRequestEmail::build(
                &self.config.get_from_address(),
                &self.config.admin_email,
                &Self::summary(request),
            )
            .map_err(delivery_error)?;
            self.send(email).await
        }

        async fn send_request_confirmation(&self, request: &ServiceRequest) -> Result<(), Error> {
            let email = RequestConfirmationEmail::build(
                &self.config.get_from_address(),
                &self.config.app_name,
                &Self::summary(request),
            )
            .map_err(delivery_error)?;
            self.send(email).await
        }

        async fn send_request_completed(&self, request: &ServiceRequest) -> Result<(), Error> {
            let email = RequestCompletedEmail::build(
                &self.config.get_from_address(),
                &self.config.app_name,
                &request.email,
                &request.name,
                &request.address,
            )
            .map_err(delivery_error)?;
            self.send(email).await
        }

        async fn send_request_cancelled(&self, request: &ServiceRequest) -> Result<(), Error> {
            let email = RequestCancelledEmail::build(
                &self.config.get_from_address(),
                &self.config.app_name,
                &request.email,
                &request.name,
                &request.address,
                request.admin_notes.as_deref(),
            )
            .map_err(delivery_error)?;
            self.send(email).await
        }
    }

}
