use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use videmaison_core::{
    Error, LockState, NewUser, User, UserId, error::AuthError, repositories::UserRepository,
};

use crate::{SqliteUser, from_timestamp, repositories::database_error};

/// Timestamps are stored in whole seconds. Lock expiries round up so a
/// lock never ends before the requested instant.
fn ceil_timestamp(at: DateTime<Utc>) -> i64 {
    at.timestamp() + i64::from(at.timestamp_subsec_nanos() > 0)
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteLockState {
    failed_login_attempts: i64,
    account_locked_until: Option<i64>,
}

impl From<SqliteLockState> for LockState {
    fn from(row: SqliteLockState) -> Self {
        LockState {
            failed_login_attempts: row.failed_login_attempts.max(0) as u32,
            locked_until: row.account_locked_until.map(from_timestamp),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, email, password_hash, role, first_name, last_name,
                               password_changed_at, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7)
            RETURNING *
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                Error::Auth(AuthError::UserAlreadyExists)
            } else {
                database_error("Failed to create user")(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("Failed to find user"))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("Failed to find user"))?;

        Ok(row.map(User::from))
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(is_active)
            .bind(Utc::now().timestamp())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error("Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn record_failed_login(
        &self,
        email: &str,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<LockState>, Error> {
        // An expired lock restarts the count at 1; an active lock matches no row.
        let updated = sqlx::query_as::<_, SqliteLockState>(
            r#"
            UPDATE users
            SET failed_login_attempts = CASE
                    WHEN account_locked_until IS NOT NULL THEN 1
                    ELSE failed_login_attempts + 1
                END,
                account_locked_until = CASE
                    WHEN (CASE
                            WHEN account_locked_until IS NOT NULL THEN 1
                            ELSE failed_login_attempts + 1
                          END) >= ?2 THEN ?3
                    ELSE NULL
                END,
                updated_at = ?4
            WHERE email = ?1
              AND (account_locked_until IS NULL OR account_locked_until <= ?4)
            RETURNING failed_login_attempts, account_locked_until
            "#,
        )
        .bind(email)
        .bind(i64::from(threshold))
        .bind(ceil_timestamp(lock_until))
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to record failed login"))?;

        if let Some(state) = updated {
            return Ok(Some(state.into()));
        }

        let current = sqlx::query_as::<_, SqliteLockState>(
            "SELECT failed_login_attempts, account_locked_until FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to read lock state"))?;

        Ok(current.map(LockState::from))
    }

    async fn clear_expired_lock(&self, email: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = 0, account_locked_until = NULL, updated_at = ?2
            WHERE email = ?1
              AND account_locked_until IS NOT NULL
              AND account_locked_until <= ?2
            "#,
        )
        .bind(email)
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(database_error("Failed to clear account lock"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_login_success(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = 0,
                account_locked_until = NULL,
                last_login = ?2,
                updated_at = ?2
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(database_error("Failed to record login"))?;

        Ok(())
    }
}
