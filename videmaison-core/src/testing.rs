//! In-memory repositories and recording collaborators for unit tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::{
    ChatMessage, Error, LockState, MessageId, NewServiceRequest, NewUser, RequestStatus,
    ServiceRequest, ServiceRequestId, User, UserId,
    error::AuthError,
    push::{PushChannel, PushTarget},
    repositories::{ChatRepository, ServiceRequestRepository, UserRepository},
    services::MailerService,
};

/// 2025-01-15T00:00:00Z
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()
}

pub fn sample_form() -> NewServiceRequest {
    NewServiceRequest {
        name: Some("Marie Dupont".to_string()),
        email: Some("marie@example.be".to_string()),
        phone: Some("+32 470 12 34 56".to_string()),
        address: Some("Rue Haute 12, 1000 Bruxelles".to_string()),
        service_type: Some("vide_grenier".to_string()),
        message: Some("Grenier à vider avant fin du mois.".to_string()),
        language: None,
    }
}

pub fn sample_request(language: &str) -> ServiceRequest {
    ServiceRequest {
        id: ServiceRequestId::new_random(),
        name: "Marie Dupont".to_string(),
        email: "marie@example.be".to_string(),
        phone: "+32 470 12 34 56".to_string(),
        address: "Rue Haute 12, 1000 Bruxelles".to_string(),
        service_type: "vide_grenier".to_string(),
        message: "Grenier à vider avant fin du mois.".to_string(),
        language: language.to_string(),
        status: RequestStatus::New,
        read: false,
        admin_notes: None,
        created_at: t0(),
        updated_at: t0(),
    }
}

fn user_from(new_user: NewUser, now: DateTime<Utc>) -> User {
    User {
        id: new_user.id,
        email: new_user.email,
        password_hash: new_user.password_hash,
        role: new_user.role,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        is_active: true,
        email_verified: false,
        last_login: None,
        failed_login_attempts: 0,
        account_locked_until: None,
        password_changed_at: now,
        created_at: now,
        updated_at: now,
    }
}

/// Users keyed by email. The lockout methods mirror the SQL statements.
#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<HashMap<String, User>>,
    clears: AtomicUsize,
}

impl MockUserRepository {
    pub fn with_user(email: &str) -> Self {
        let repo = Self::default();
        let user = user_from(NewUser::new(email, "not-a-real-hash".to_string()), t0());
        repo.users.lock().unwrap().insert(user.email.clone(), user);
        repo
    }

    pub fn user(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().get(email).cloned()
    }

    pub fn lock_state(&self, email: &str) -> Option<LockState> {
        self.user(email).map(|u| u.lock_state())
    }

    /// How many times an expired lock was actually cleared.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(AuthError::UserAlreadyExists.into());
        }
        let user = user_from(user, Utc::now());
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self.user(email))
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();
        match users.values_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(())
            }
            None => Err(Error::NotFound("User not found".to_string())),
        }
    }

    async fn record_failed_login(
        &self,
        email: &str,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<LockState>, Error> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(email) else {
            return Ok(None);
        };

        if user.is_locked_at(now) {
            return Ok(Some(user.lock_state()));
        }
        if user.account_locked_until.is_some() {
            user.failed_login_attempts = 0;
            user.account_locked_until = None;
        }

        user.failed_login_attempts += 1;
        if user.failed_login_attempts >= threshold {
            user.account_locked_until = Some(lock_until);
        }
        user.updated_at = now;
        Ok(Some(user.lock_state()))
    }

    async fn clear_expired_lock(&self, email: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(email) {
            Some(user) if user.account_locked_until.is_some_and(|until| until <= now) => {
                user.failed_login_attempts = 0;
                user.account_locked_until = None;
                user.updated_at = now;
                self.clears.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_login_success(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        if let Some(user) = self.users.lock().unwrap().get_mut(email) {
            user.failed_login_attempts = 0;
            user.account_locked_until = None;
            user.last_login = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockServiceRequestRepository {
    requests: Mutex<Vec<ServiceRequest>>,
}

impl MockServiceRequestRepository {
    pub fn len(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn insert_at(&self, status: RequestStatus, created_at: DateTime<Utc>) -> ServiceRequest {
        let mut request = sample_request("fr");
        request.status = status;
        request.created_at = created_at;
        request.updated_at = created_at;
        self.requests.lock().unwrap().push(request.clone());
        request
    }

    /// Newest first; ties keep the most recently inserted first.
    fn sorted(&self, filter: impl Fn(&ServiceRequest) -> bool) -> Vec<ServiceRequest> {
        let mut matching: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| filter(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

#[async_trait]
impl ServiceRequestRepository for MockServiceRequestRepository {
    async fn create(&self, request: &ServiceRequest) -> Result<ServiceRequest, Error> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(request.clone())
    }

    async fn find_by_id(&self, id: &ServiceRequestId) -> Result<Option<ServiceRequest>, Error> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<RequestStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ServiceRequest>, Error> {
        Ok(self
            .sorted(|r| status.is_none_or(|s| r.status == s))
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, status: Option<RequestStatus>) -> Result<u64, Error> {
        Ok(self.sorted(|r| status.is_none_or(|s| r.status == s)).len() as u64)
    }

    async fn count_unread(&self) -> Result<u64, Error> {
        Ok(self.sorted(|r| !r.read).len() as u64)
    }

    async fn mark_read(&self, id: &ServiceRequestId) -> Result<bool, Error> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter_mut().find(|r| &r.id == id) {
            Some(request) => {
                request.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_status(
        &self,
        id: &ServiceRequestId,
        status: RequestStatus,
        admin_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, Error> {
        let mut requests = self.requests.lock().unwrap();
        Ok(requests.iter_mut().find(|r| &r.id == id).map(|request| {
            request.status = status;
            if let Some(notes) = admin_notes {
                request.admin_notes = Some(notes.to_string());
            }
            request.updated_at = now;
            request.clone()
        }))
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        Ok(self.sorted(|r| start <= r.created_at && r.created_at < end))
    }
}

#[derive(Default)]
pub struct MockChatRepository {
    messages: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl ChatRepository for MockChatRepository {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, Error> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(message.clone())
    }

    async fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, Error> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                (&m.sender_id == a && &m.receiver_id == b)
                    || (&m.sender_id == b && &m.receiver_id == a)
            })
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, Error> {
        let mut messages = self.messages.lock().unwrap();
        match messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                message.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailEvent {
    NewRequest(ServiceRequestId),
    Confirmation(ServiceRequestId),
    Completed(ServiceRequestId),
    Cancelled(ServiceRequestId),
}

#[derive(Default)]
pub struct RecordingMailerService {
    events: Mutex<Vec<MailEvent>>,
    failing: AtomicBool,
}

impl RecordingMailerService {
    pub fn events(&self) -> Vec<MailEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn record(&self, event: MailEvent) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Delivery("transport unavailable".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl MailerService for RecordingMailerService {
    async fn send_new_request_notification(&self, request: &ServiceRequest) -> Result<(), Error> {
        self.record(MailEvent::NewRequest(request.id.clone()))
    }

    async fn send_request_confirmation(&self, request: &ServiceRequest) -> Result<(), Error> {
        self.record(MailEvent::Confirmation(request.id.clone()))
    }

    async fn send_request_completed(&self, request: &ServiceRequest) -> Result<(), Error> {
        self.record(MailEvent::Completed(request.id.clone()))
    }

    async fn send_request_cancelled(&self, request: &ServiceRequest) -> Result<(), Error> {
        self.record(MailEvent::Cancelled(request.id.clone()))
    }
}

#[derive(Default)]
pub struct RecordingPushChannel {
    events: Mutex<Vec<(String, Value, PushTarget)>>,
}

impl RecordingPushChannel {
    pub fn events(&self) -> Vec<(String, Value, PushTarget)> {
        self.events.lock().unwrap().clone()
    }
}

impl PushChannel for RecordingPushChannel {
    fn emit(&self, event: &str, payload: Value, target: PushTarget) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload, target));
    }
}
