use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, LockState, NewUser, User, UserId};

/// Repository for user records, including the persisted lockout fields.
///
/// The lockout mutations must each be a single atomic update so concurrent
/// login attempts cannot both act on a stale counter.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Fails with `AuthError::UserAlreadyExists` on a duplicate email.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error>;

    /// Atomically increments the failure counter and, once it reaches
    /// `threshold`, sets `account_locked_until = lock_until`.
    ///
    /// While a lock is in force at `now` the record is left untouched. A lock
    /// that has already expired is treated as cleared before counting.
    /// Returns `None` when no user has this email.
    async fn record_failed_login(
        &self,
        email: &str,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<LockState>, Error>;

    /// Compare-and-set: clears an expired lock and resets the counter.
    ///
    /// Returns `true` only for the caller that performed the clear.
    async fn clear_expired_lock(&self, email: &str, now: DateTime<Utc>) -> Result<bool, Error>;

    /// Resets the counter, clears any lock and sets `last_login = now`.
    async fn record_login_success(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error>;
}
