//! User accounts.
//!
//! | Field                   | Description                                              |
//! | ----------------------- | -------------------------------------------------------- |
//! | `email`                 | Lower-cased, trimmed; unique                             |
//! | `role`                  | `user` or `admin`                                        |
//! | `failed_login_attempts` | Consecutive failures since the last success or unlock    |
//! | `account_locked_until`  | Set when the failure threshold is reached                |
//! | `last_login`            | Updated on every successful login                        |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::prefixed_id;

prefixed_id!(
    /// Opaque, stable user identifier (`usr_…`).
    UserId,
    "usr"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub failed_login_attempts: u32,
    pub account_locked_until: Option<DateTime<Utc>>,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether a stored lock is still in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.account_locked_until.is_some_and(|until| now < until)
    }

    pub fn lock_state(&self) -> LockState {
        LockState {
            failed_login_attempts: self.failed_login_attempts,
            locked_until: self.account_locked_until,
        }
    }
}

/// The persisted lockout fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockState {
    pub failed_login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    pub fn new(email: &str, password_hash: String) -> Self {
        Self {
            id: UserId::new_random(),
            email: crate::validation::normalize_email(email),
            password_hash,
            role: Role::User,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_name(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }
}
