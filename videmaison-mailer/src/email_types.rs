use askama::Template;
use chrono::{DateTime, Utc};

use crate::{
    Email, Locale, MailerError,
    templates::{
        AdminNewRequestTemplate, ConfirmationHtmlTemplate, ConfirmationTextTemplate,
        RequestCancelledTemplate, RequestCompletedTemplate,
    },
};

/// The fields of a submitted service request that the emails render.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Display name of the service type, e.g. "Vide Grenier".
    pub service_name: String,
    pub message: String,
    pub language: String,
    pub submitted_at: DateTime<Utc>,
}

pub struct AdminNewRequestEmail;

impl AdminNewRequestEmail {
    pub fn build(from: &str, to: &str, request: &RequestSummary) -> Result<Email, MailerError> {
        let html_body = AdminNewRequestTemplate {
            name: &request.name,
            email: &request.email,
            phone: &request.phone,
            service_name: &request.service_name,
            address: &request.address,
            message: &request.message,
            language: Locale::from_code(&request.language).code().to_uppercase(),
            submitted_at: request
                .submitted_at
                .format("%d/%m/%Y à %H:%M")
                .to_string(),
        }
        .render()?;

        Email::builder()
            .from(from)
            .to(to)
            .subject("Nouvelle Demande de Service")
            .text_body(format!(
                "New service request from {} for {} service.",
                request.name, request.service_name
            ))
            .html_body(html_body)
            .build()
    }
}

pub struct RequestConfirmationEmail;

impl RequestConfirmationEmail {
    pub fn build(
        from: &str,
        app_name: &str,
        request: &RequestSummary,
    ) -> Result<Email, MailerError> {
        let copy = Locale::from_code(&request.language).copy();

        let html_body = ConfirmationHtmlTemplate {
            app_name,
            copy,
            name: &request.name,
            phone: &request.phone,
            service_name: &request.service_name,
            address: &request.address,
            message: &request.message,
        }
        .render()?;

        let text_body = ConfirmationTextTemplate {
            copy,
            name: &request.name,
            phone: &request.phone,
            service_name: &request.service_name,
            address: &request.address,
            message: &request.message,
        }
        .render()?;

        Email::builder()
            .from(from)
            .to(request.email.as_str())
            .subject(copy.subject)
            .text_body(text_body)
            .html_body(html_body)
            .build()
    }
}

pub struct RequestCompletedEmail;

impl RequestCompletedEmail {
    pub fn build(
        from: &str,
        app_name: &str,
        to: &str,
        name: &str,
        address: &str,
    ) -> Result<Email, MailerError> {
        let html_body = RequestCompletedTemplate {
            app_name,
            name,
            address,
        }
        .render()?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(format!("Service Terminé - {app_name}"))
            .html_body(html_body)
            .build()
    }
}

pub struct RequestCancelledEmail;

impl RequestCancelledEmail {
    pub const DEFAULT_REASON: &'static str = "Raison non spécifiée";

    pub fn build(
        from: &str,
        app_name: &str,
        to: &str,
        name: &str,
        address: &str,
        reason: Option<&str>,
    ) -> Result<Email, MailerError> {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(Self::DEFAULT_REASON);

        let html_body = RequestCancelledTemplate {
            app_name,
            name,
            address,
            reason,
        }
        .render()?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(format!("Service Annulé - {app_name}"))
            .html_body(html_body)
            .build()
    }
}
