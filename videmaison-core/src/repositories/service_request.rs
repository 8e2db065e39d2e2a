use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, RequestStatus, ServiceRequest, ServiceRequestId};

#[async_trait]
pub trait ServiceRequestRepository: Send + Sync + 'static {
    async fn create(&self, request: &ServiceRequest) -> Result<ServiceRequest, Error>;

    async fn find_by_id(&self, id: &ServiceRequestId) -> Result<Option<ServiceRequest>, Error>;

    /// Newest first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<RequestStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ServiceRequest>, Error>;

    async fn count(&self, status: Option<RequestStatus>) -> Result<u64, Error>;

    async fn count_unread(&self) -> Result<u64, Error>;

    /// Returns `false` when the request does not exist.
    async fn mark_read(&self, id: &ServiceRequestId) -> Result<bool, Error>;

    /// Sets the status, and the notes only when `admin_notes` is `Some`.
    async fn update_status(
        &self,
        id: &ServiceRequestId,
        status: RequestStatus,
        admin_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, Error>;

    /// Requests with `start <= created_at < end`, newest first.
    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ServiceRequest>, Error>;
}
