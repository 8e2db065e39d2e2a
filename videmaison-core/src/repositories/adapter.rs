use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    ChatMessage, Error, LockState, MessageId, NewUser, RequestStatus, ServiceRequest,
    ServiceRequestId, User, UserId,
    repositories::{ChatRepository, RepositoryProvider, ServiceRequestRepository, UserRepository},
};

/// Exposes a shared provider's user repository as an owned `UserRepository`.
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error> {
        self.provider.user().set_active(id, is_active).await
    }

    async fn record_failed_login(
        &self,
        email: &str,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<LockState>, Error> {
        self.provider
            .user()
            .record_failed_login(email, threshold, lock_until, now)
            .await
    }

    async fn clear_expired_lock(&self, email: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        self.provider.user().clear_expired_lock(email, now).await
    }

    async fn record_login_success(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        self.provider.user().record_login_success(email, now).await
    }
}

pub struct ServiceRequestRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ServiceRequestRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ServiceRequestRepository for ServiceRequestRepositoryAdapter<R> {
    async fn create(&self, request: &ServiceRequest) -> Result<ServiceRequest, Error> {
        self.provider.service_request().create(request).await
    }

    async fn find_by_id(&self, id: &ServiceRequestId) -> Result<Option<ServiceRequest>, Error> {
        self.provider.service_request().find_by_id(id).await
    }

    async fn list(
        &self,
        status: Option<RequestStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ServiceRequest>, Error> {
        self.provider
            .service_request()
            .list(status, offset, limit)
            .await
    }

    async fn count(&self, status: Option<RequestStatus>) -> Result<u64, Error> {
        self.provider.service_request().count(status).await
    }

    async fn count_unread(&self) -> Result<u64, Error> {
        self.provider.service_request().count_unread().await
    }

    async fn mark_read(&self, id: &ServiceRequestId) -> Result<bool, Error> {
        self.provider.service_request().mark_read(id).await
    }

    async fn update_status(
        &self,
        id: &ServiceRequestId,
        status: RequestStatus,
        admin_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, Error> {
        self.provider
            .service_request()
            .update_status(id, status, admin_notes, now)
            .await
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        self.provider
            .service_request()
            .list_created_between(start, end)
            .await
    }
}

pub struct ChatRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ChatRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ChatRepository for ChatRepositoryAdapter<R> {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, Error> {
        self.provider.chat().create(message).await
    }

    async fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, Error> {
        self.provider.chat().conversation(a, b).await
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, Error> {
        self.provider.chat().mark_read(id).await
    }
}
