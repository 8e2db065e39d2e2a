//! Versioned schema migrations.
//!
//! A storage backend implements [`MigrationManager`] for its database and
//! supplies an ordered list of [`Migration`]s. Applied versions are recorded in
//! a tracking table so `up` is idempotent.

use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Apply the schema change.
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Revert the schema change.
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Ordering key; must be unique across a backend's migrations.
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix seconds.
    pub applied_at: i64,
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_videmaison_migrations"
    }

    async fn initialize(&self) -> Result<()>;

    /// Apply every migration not yet recorded, in slice order.
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Revert every migration that is recorded, in slice order.
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;

    /// Versions from `migrations` that have not been applied yet.
    async fn pending_versions(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<Vec<i64>> {
        let applied: Vec<i64> = self
            .get_applied_migrations()
            .await?
            .into_iter()
            .map(|record| record.version)
            .collect();

        Ok(migrations
            .iter()
            .map(|m| m.version())
            .filter(|version| !applied.contains(version))
            .collect())
    }
}
