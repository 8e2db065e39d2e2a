//! SQLite storage backend.
//!
//! Timestamps are stored as unix seconds in `INTEGER` columns. Rows are read
//! into the private `Sqlite*` structs below and converted into core types.

pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteChatRepository, SqliteRepositoryProvider, SqliteServiceRequestRepository,
    SqliteUserRepository,
};

use chrono::{DateTime, Utc};
use videmaison_core::{
    ChatMessage, MessageId, RequestStatus, ServiceRequest, ServiceRequestId, User, UserId,
};

pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SqliteUser {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_active: bool,
    email_verified: bool,
    last_login: Option<i64>,
    failed_login_attempts: i64,
    account_locked_until: Option<i64>,
    password_changed_at: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<SqliteUser> for User {
    fn from(row: SqliteUser) -> Self {
        User {
            id: UserId::new(&row.id),
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().unwrap_or_default(),
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            email_verified: row.email_verified,
            last_login: row.last_login.map(from_timestamp),
            failed_login_attempts: row.failed_login_attempts.max(0) as u32,
            account_locked_until: row.account_locked_until.map(from_timestamp),
            password_changed_at: from_timestamp(row.password_changed_at),
            created_at: from_timestamp(row.created_at),
            updated_at: from_timestamp(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SqliteServiceRequest {
    id: String,
    name: String,
    email: String,
    phone: String,
    address: String,
    service_type: String,
    message: String,
    language: String,
    status: String,
    read: bool,
    admin_notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<SqliteServiceRequest> for ServiceRequest {
    fn from(row: SqliteServiceRequest) -> Self {
        ServiceRequest {
            id: ServiceRequestId::new(&row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            service_type: row.service_type,
            message: row.message,
            language: row.language,
            status: row.status.parse().unwrap_or(RequestStatus::New),
            read: row.read,
            admin_notes: row.admin_notes,
            created_at: from_timestamp(row.created_at),
            updated_at: from_timestamp(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SqliteChatMessage {
    id: String,
    sender_id: String,
    receiver_id: String,
    content: String,
    message_type: String,
    read: bool,
    created_at: i64,
}

impl From<SqliteChatMessage> for ChatMessage {
    fn from(row: SqliteChatMessage) -> Self {
        ChatMessage {
            id: MessageId::new(&row.id),
            sender_id: UserId::new(&row.sender_id),
            receiver_id: UserId::new(&row.receiver_id),
            content: row.content,
            message_type: row.message_type,
            read: row.read,
            created_at: from_timestamp(row.created_at),
        }
    }
}
