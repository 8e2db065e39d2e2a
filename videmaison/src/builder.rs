//! Type-state builder for [`VideMaison`].
//!
//! Storage must be configured before [`VideMaisonBuilder::build`] is callable:
//!
//! ```rust,no_run
//! use videmaison::{JwtConfig, VideMaisonBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = VideMaisonBuilder::new()
//!     .with_sqlite("sqlite::memory:")
//!     .await?
//!     .with_jwt(JwtConfig::new_hs256(b"secret".to_vec()))
//!     .apply_migrations(true)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use videmaison_core::{
    security::LoginGuardConfig,
    services::{MailerService, NoopMailerService},
};

use crate::{JwtConfig, NoopPushChannel, PushChannel, RepositoryProvider, SecurityConfig, VideMaison};

#[cfg(feature = "mailer")]
use crate::MailerConfig;

#[derive(Debug, thiserror::Error)]
pub enum VideMaisonBuilderError {
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[cfg(feature = "mailer")]
    #[error("Mailer configuration failed: {0}")]
    MailerConfiguration(String),
}

/// Initial state: no storage configured yet.
pub struct NoStorage;

pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

enum MailerChoice {
    Disabled,
    Service(Arc<dyn MailerService>),
    #[cfg(feature = "mailer")]
    Config(MailerConfig),
}

pub struct VideMaisonBuilder<Storage> {
    storage: Storage,
    jwt: Option<JwtConfig>,
    login_guard: LoginGuardConfig,
    security: SecurityConfig,
    mailer: MailerChoice,
    push: Arc<dyn PushChannel>,
    apply_migrations: bool,
}

impl Default for VideMaisonBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl VideMaisonBuilder<NoStorage> {
    /// Defaults: 5 failures lock an account for 30 minutes, the stock rate
    /// limit policies, no email, no push, no automatic migrations.
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            jwt: None,
            login_guard: LoginGuardConfig::default(),
            security: SecurityConfig::default(),
            mailer: MailerChoice::Disabled,
            push: Arc::new(NoopPushChannel),
            apply_migrations: false,
        }
    }

    /// Use an existing repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> VideMaisonBuilder<WithStorage<R>> {
        VideMaisonBuilder {
            storage: WithStorage { repositories },
            jwt: self.jwt,
            login_guard: self.login_guard,
            security: self.security,
            mailer: self.mailer,
            push: self.push,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl VideMaisonBuilder<NoStorage> {
    /// Connect to a SQLite database, creating the file when missing.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<VideMaisonBuilder<WithStorage<crate::SqliteRepositoryProvider>>, VideMaisonBuilderError>
    {
        let repositories = crate::SqliteRepositoryProvider::connect(url)
            .await
            .map_err(|e| VideMaisonBuilderError::StorageConnection(e.to_string()))?;
        Ok(self.with_repositories(Arc::new(repositories)))
    }

    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> VideMaisonBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

impl<S> VideMaisonBuilder<S> {
    pub fn with_jwt(mut self, config: JwtConfig) -> Self {
        self.jwt = Some(config);
        self
    }

    pub fn with_login_guard(mut self, config: LoginGuardConfig) -> Self {
        self.login_guard = config;
        self
    }

    pub fn with_security_config(mut self, config: SecurityConfig) -> Self {
        self.security = config;
        self
    }

    /// Use a ready-made mailer service, e.g. a recording one in tests.
    pub fn with_mailer_service(mut self, mailer: Arc<dyn MailerService>) -> Self {
        self.mailer = MailerChoice::Service(mailer);
        self
    }

    #[cfg(feature = "mailer")]
    pub fn with_mailer(mut self, config: MailerConfig) -> Self {
        self.mailer = MailerChoice::Config(config);
        self
    }

    pub fn with_push_channel(mut self, push: Arc<dyn PushChannel>) -> Self {
        self.push = push;
        self
    }

    /// Run pending migrations during [`VideMaisonBuilder::build`].
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }
}

impl<R: RepositoryProvider> VideMaisonBuilder<WithStorage<R>> {
    pub async fn build(self) -> Result<VideMaison<R>, VideMaisonBuilderError> {
        let jwt = self.jwt.ok_or_else(|| {
            VideMaisonBuilderError::InvalidConfiguration("a JWT signing secret is required".to_string())
        })?;

        let mailer: Arc<dyn MailerService> = match self.mailer {
            MailerChoice::Disabled => {
                tracing::warn!("No mailer configured, notification emails are disabled");
                Arc::new(NoopMailerService)
            }
            MailerChoice::Service(service) => service,
            #[cfg(feature = "mailer")]
            MailerChoice::Config(config) => Arc::new(
                videmaison_core::services::VideMaisonMailerService::new(config)
                    .map_err(|e| VideMaisonBuilderError::MailerConfiguration(e.to_string()))?,
            ),
        };

        let app = VideMaison::from_parts(
            self.storage.repositories,
            jwt,
            self.login_guard,
            self.security,
            mailer,
            self.push,
        );

        if self.apply_migrations {
            app.migrate()
                .await
                .map_err(|e| VideMaisonBuilderError::Migration(e.to_string()))?;
        }

        Ok(app)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> sqlx::SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_requires_jwt() {
        let result = VideMaisonBuilder::new()
            .with_sqlite_pool(pool().await)
            .build()
            .await;
        assert!(matches!(
            result,
            Err(VideMaisonBuilderError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_build_with_migrations() {
        let app = VideMaisonBuilder::new()
            .with_sqlite_pool(pool().await)
            .with_jwt(JwtConfig::new_hs256(b"builder-secret".to_vec()))
            .with_login_guard(LoginGuardConfig {
                max_failed_attempts: 3,
                ..Default::default()
            })
            .apply_migrations(true)
            .build()
            .await
            .unwrap();

        app.health_check().await.unwrap();
        assert_eq!(app.auth().login_guard().config().max_failed_attempts, 3);
        assert!(app.repositories().pending_migrations().await.unwrap().is_empty());
    }

    #[cfg(feature = "mailer")]
    #[tokio::test]
    async fn test_build_with_file_mailer() {
        let dir = std::env::temp_dir().join(format!("videmaison-builder-{}", std::process::id()));
        let config = MailerConfig {
            transport: videmaison_mailer::TransportConfig::File {
                output_dir: dir.clone(),
            },
            ..MailerConfig::default()
        };

        let app = VideMaisonBuilder::new()
            .with_sqlite_pool(pool().await)
            .with_jwt(JwtConfig::new_hs256(b"builder-secret".to_vec()))
            .with_mailer(config)
            .apply_migrations(true)
            .build()
            .await
            .unwrap();
        app.health_check().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }
}
