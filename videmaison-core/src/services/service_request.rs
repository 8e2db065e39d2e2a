use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::{
    Error, NewServiceRequest, RequestStatus, ServiceRequest, ServiceRequestId,
    error::ValidationError,
    push::{PushChannel, PushTarget},
    repositories::ServiceRequestRepository,
    service_request::{
        DEFAULT_LANGUAGE, DashboardStats, PAGE_SIZE, RecentRequest, RequestPage, SERVICE_TYPES,
        ServiceType, StatusCounts,
    },
    services::MailerService,
    validation::{check_max_length, is_valid_email_format, require_fields, sanitize_input},
};

const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 30;
const MAX_ADDRESS_LENGTH: usize = 500;
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Contact-form submissions and the admin workflow around them.
pub struct ServiceRequestService<R: ServiceRequestRepository> {
    requests: Arc<R>,
    mailer: Arc<dyn MailerService>,
    push: Arc<dyn PushChannel>,
}

impl<R: ServiceRequestRepository> ServiceRequestService<R> {
    pub fn new(requests: Arc<R>, mailer: Arc<dyn MailerService>, push: Arc<dyn PushChannel>) -> Self {
        Self {
            requests,
            mailer,
            push,
        }
    }

    /// Validates and stores a submission, then notifies the admin and the
    /// customer. Notification failures are logged only.
    pub async fn submit(&self, form: NewServiceRequest) -> Result<ServiceRequest, Error> {
        require_fields(&[
            ("name", form.name.as_deref()),
            ("email", form.email.as_deref()),
            ("phone", form.phone.as_deref()),
            ("address", form.address.as_deref()),
            ("service_type", form.service_type.as_deref()),
            ("message", form.message.as_deref()),
        ])?;

        let field = |v: Option<String>| v.map(|v| v.trim().to_string()).unwrap_or_default();
        let name = sanitize_input(&field(form.name));
        let email = field(form.email).to_lowercase();
        let phone = sanitize_input(&field(form.phone));
        let address = sanitize_input(&field(form.address));
        let service_type = sanitize_input(&field(form.service_type));
        let message = field(form.message);

        // Customers may use any deliverable address, disposable or not.
        if !is_valid_email_format(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        check_max_length("name", &name, MAX_NAME_LENGTH)?;
        check_max_length("phone", &phone, MAX_PHONE_LENGTH)?;
        check_max_length("address", &address, MAX_ADDRESS_LENGTH)?;
        check_max_length("message", &message, MAX_MESSAGE_LENGTH)?;

        let language = form
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let now = Utc::now();
        let request = ServiceRequest {
            id: ServiceRequestId::new_random(),
            name,
            email,
            phone,
            address,
            service_type,
            message,
            language,
            status: RequestStatus::New,
            read: false,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        let request = self.requests.create(&request).await?;

        tracing::info!(
            request_id = %request.id,
            service_type = %request.service_type,
            language = %request.language,
            "Service request submitted"
        );

        if let Err(e) = self.mailer.send_new_request_notification(&request).await {
            tracing::warn!(request_id = %request.id, error = %e, "Failed to send admin notification");
        }
        if let Err(e) = self.mailer.send_request_confirmation(&request).await {
            tracing::warn!(request_id = %request.id, error = %e, "Failed to send customer confirmation");
        }

        self.push.emit(
            "new_request",
            json!({
                "id": request.id,
                "name": request.name,
                "service_type": request.service_type,
                "email": request.email,
                "phone": request.phone,
                "address": request.address,
                "language": request.language,
                "created_at": request.created_at.to_rfc3339(),
            }),
            PushTarget::admin(),
        );

        Ok(request)
    }

    /// One page of requests, newest first. Pages are 1-based; 0 reads as 1.
    pub async fn list(&self, page: u64, status: Option<RequestStatus>) -> Result<RequestPage, Error> {
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(PAGE_SIZE).min(i64::MAX as u64);
        let total = self.requests.count(status).await?;
        let requests = self.requests.list(status, offset, PAGE_SIZE).await?;

        Ok(RequestPage {
            requests,
            page,
            total,
            total_pages: RequestPage::total_pages_for(total),
        })
    }

    pub async fn get(&self, id: &ServiceRequestId) -> Result<ServiceRequest, Error> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Service request not found".to_string()))
    }

    pub async fn mark_read(&self, id: &ServiceRequestId) -> Result<(), Error> {
        if !self.requests.mark_read(id).await? {
            return Err(Error::NotFound("Service request not found".to_string()));
        }
        Ok(())
    }

    pub async fn unread_count(&self) -> Result<u64, Error> {
        self.requests.count_unread().await
    }

    /// Moves a request to an admin-assignable status.
    ///
    /// Completion and cancellation notify the customer; `admin_notes` is only
    /// overwritten when provided and doubles as the cancellation reason.
    pub async fn update_status(
        &self,
        id: &ServiceRequestId,
        status: &str,
        admin_notes: Option<&str>,
    ) -> Result<ServiceRequest, Error> {
        let status = status
            .parse::<RequestStatus>()
            .ok()
            .filter(RequestStatus::is_admin_assignable)
            .ok_or_else(invalid_status)?;

        let request = self
            .requests
            .update_status(id, status, admin_notes, Utc::now())
            .await?
            .ok_or_else(|| Error::NotFound("Service request not found".to_string()))?;

        tracing::info!(request_id = %request.id, status = %status, "Service request status updated");

        let sent = match status {
            RequestStatus::Completed => self.mailer.send_request_completed(&request).await,
            RequestStatus::Cancelled => self.mailer.send_request_cancelled(&request).await,
            _ => Ok(()),
        };
        if let Err(e) = sent {
            tracing::warn!(request_id = %request.id, error = %e, "Failed to send status email");
        }

        Ok(request)
    }

    /// All-time total plus today's breakdown, where "today" is the UTC day
    /// containing `now`.
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, Error> {
        let total_requests = self.requests.count(None).await?;

        let start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);
        let todays = self
            .requests
            .list_created_between(start, start + Duration::days(1))
            .await?;

        let mut today = StatusCounts::default();
        for request in &todays {
            match request.status {
                RequestStatus::Pending => today.pending += 1,
                RequestStatus::InProgress => today.in_progress += 1,
                RequestStatus::Completed => today.completed += 1,
                RequestStatus::Cancelled => today.cancelled += 1,
                RequestStatus::New => {}
            }
        }

        let recent_requests = todays
            .into_iter()
            .map(|r| RecentRequest {
                id: r.id,
                name: r.name,
                email: r.email,
                service_type: r.service_type,
                status: r.status,
                created_at: r.created_at.format("%d/%m/%Y %H:%M").to_string(),
            })
            .collect();

        Ok(DashboardStats {
            total_requests,
            today,
            recent_requests,
        })
    }

    pub fn service_types(&self) -> &'static [ServiceType] {
        &SERVICE_TYPES
    }
}

fn invalid_status() -> Error {
    let allowed = RequestStatus::ADMIN_ASSIGNABLE
        .iter()
        .map(RequestStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    ValidationError::InvalidField(format!("Invalid status. Must be one of: {allowed}")).into()
}
