//! Per-account failed-login counter with timed lockout.
//!
//! State lives on the user record (see [`LockState`]). The guard is consulted
//! in a fixed order by the login flow:
//!
//! 1. [`LoginGuard::check_locked`] before any credential comparison. A lock
//!    that has expired is cleared here, so this read can write.
//! 2. [`LoginGuard::record_failure`] after a credential mismatch.
//! 3. [`LoginGuard::record_success`] after a match.
//!
//! Because step 1 short-circuits, failures during an active lock are never
//! counted and do not extend it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{Error, LockState, repositories::UserRepository};

#[derive(Debug, Clone, Copy)]
pub struct LoginGuardConfig {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LoginGuardConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
        }
    }
}

pub struct LoginGuard<U: UserRepository> {
    users: Arc<U>,
    config: LoginGuardConfig,
}

impl<U: UserRepository> LoginGuard<U> {
    pub fn new(users: Arc<U>, config: LoginGuardConfig) -> Self {
        Self { users, config }
    }

    pub fn config(&self) -> &LoginGuardConfig {
        &self.config
    }

    /// `true` iff the account has a lock in force right now.
    pub async fn check_locked(&self, email: &str) -> Result<bool, Error> {
        Ok(self.check_locked_at(email, Utc::now()).await?.is_some())
    }

    /// Returns the lock expiry when locked at `now`.
    ///
    /// An expired lock is cleared and the counter reset. Concurrent callers
    /// race on a compare-and-set; exactly one performs the clear.
    pub async fn check_locked_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };

        match user.account_locked_until {
            Some(until) if now < until => Ok(Some(until)),
            Some(_) => {
                if self.users.clear_expired_lock(email, now).await? {
                    tracing::info!(email = %email, "Account lock expired and was cleared");
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Counts a failed attempt. Unknown emails are a no-op returning `None`.
    pub async fn record_failure(&self, email: &str) -> Result<Option<LockState>, Error> {
        self.record_failure_at(email, Utc::now()).await
    }

    pub async fn record_failure_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LockState>, Error> {
        let state = self
            .users
            .record_failed_login(
                email,
                self.config.max_failed_attempts,
                now + self.config.lockout_duration,
                now,
            )
            .await?;

        if let Some(state) = &state {
            match state.locked_until {
                Some(until) if now < until => {
                    tracing::warn!(
                        email = %email,
                        attempts = state.failed_login_attempts,
                        locked_until = %until,
                        "Account locked after repeated failed logins"
                    );
                }
                _ => {
                    tracing::warn!(
                        email = %email,
                        attempts = state.failed_login_attempts,
                        "Failed login attempt"
                    );
                }
            }
        }

        Ok(state)
    }

    pub async fn record_success(&self, email: &str) -> Result<(), Error> {
        self.record_success_at(email, Utc::now()).await
    }

    pub async fn record_success_at(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        self.users.record_login_success(email, now).await
    }
}
