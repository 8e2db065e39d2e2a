//! Repository implementations for SQLite storage

pub mod chat;
pub mod service_request;
pub mod user;

pub use chat::SqliteChatRepository;
pub use service_request::SqliteServiceRequestRepository;
pub use user::SqliteUserRepository;

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use videmaison_core::{
    Error,
    error::StorageError,
    repositories::{
        ChatRepositoryProvider, RepositoryProvider, ServiceRequestRepositoryProvider,
        UserRepositoryProvider,
    },
};
use videmaison_migration::MigrationManager;

use crate::migrations::{self, SqliteMigrationManager};

pub(crate) fn database_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| {
        tracing::error!(error = %e, "{context}");
        Error::Storage(StorageError::Database(context.to_string()))
    }
}

/// Every repository over one shared pool.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    service_request: Arc<SqliteServiceRequestRepository>,
    chat: Arc<SqliteChatRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user: Arc::new(SqliteUserRepository::new(pool.clone())),
            service_request: Arc::new(SqliteServiceRequestRepository::new(pool.clone())),
            chat: Arc::new(SqliteChatRepository::new(pool.clone())),
            pool,
        }
    }

    /// Opens `database_url`, creating the database file when missing.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::Storage(StorageError::Connection(e.to_string())))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %database_url, "Failed to open database");
                Error::Storage(StorageError::Connection(e.to_string()))
            })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Versions that [`RepositoryProvider::migrate`] would apply.
    pub async fn pending_migrations(&self) -> Result<Vec<i64>, Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        let migration_error = |e: videmaison_migration::MigrationError| {
            Error::Storage(StorageError::Migration(e.to_string()))
        };
        manager.initialize().await.map_err(migration_error)?;
        manager
            .pending_versions(&migrations::all())
            .await
            .map_err(migration_error)
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ServiceRequestRepositoryProvider for SqliteRepositoryProvider {
    type ServiceRequestRepo = SqliteServiceRequestRepository;

    fn service_request(&self) -> &Self::ServiceRequestRepo {
        &self.service_request
    }
}

impl ChatRepositoryProvider for SqliteRepositoryProvider {
    type ChatRepo = SqliteChatRepository;

    fn chat(&self) -> &Self::ChatRepo {
        &self.chat
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
