//! # Vide Maison
//!
//! Backend for a house-clearance business: a public contact form that creates
//! service requests, an admin workflow around those requests, password login
//! with JWT bearer tokens and direct chat between users.
//!
//! [`VideMaison`] wires a storage backend into the services from
//! `videmaison-core` and owns the process-local [`SecurityState`]. Build one
//! with [`VideMaisonBuilder`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use videmaison::{JwtConfig, VideMaisonBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = VideMaisonBuilder::new()
//!         .with_sqlite("sqlite://videmaison.db?mode=rwc")
//!         .await?
//!         .with_jwt(JwtConfig::new_hs256(b"change-me".to_vec()))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     app.health_check().await?;
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use tokio::{sync::watch::Receiver, task::JoinHandle};
use videmaison_core::{
    repositories::{ChatRepositoryAdapter, ServiceRequestRepositoryAdapter, UserRepositoryAdapter},
    security::LoginGuardConfig,
    services::{AuthService, ChatService, MailerService, ServiceRequestService},
};

pub mod builder;
pub mod config;

pub use builder::{NoStorage, VideMaisonBuilder, VideMaisonBuilderError, WithStorage};
pub use config::AppConfig;

/// Re-export core types from videmaison_core
pub use videmaison_core::{
    ChatMessage, Claims, DashboardStats, Error, JwtConfig, MessageId, NewServiceRequest,
    NoopPushChannel, PushChannel, PushTarget, RequestPage, RequestStatus, Role, SecurityConfig,
    SecurityState, ServiceRequest, ServiceRequestId, ServiceType, TokenIssuer, User, UserId,
    repositories::RepositoryProvider,
};

#[cfg(feature = "sqlite")]
pub use videmaison_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "mailer")]
pub use videmaison_mailer::MailerConfig;

pub type Users<R> = UserRepositoryAdapter<R>;
pub type ServiceRequests<R> = ServiceRequestRepositoryAdapter<R>;
pub type ChatMessages<R> = ChatRepositoryAdapter<R>;

/// The application core: services over one repository provider, plus the
/// in-memory security stores.
pub struct VideMaison<R: RepositoryProvider> {
    repositories: Arc<R>,
    tokens: Arc<TokenIssuer>,
    auth: Arc<AuthService<Users<R>>>,
    service_requests: Arc<ServiceRequestService<ServiceRequests<R>>>,
    chat: Arc<ChatService<ChatMessages<R>>>,
    security: Arc<SecurityState>,
}

impl<R: RepositoryProvider> VideMaison<R> {
    /// Default security policies, no email and no realtime push.
    pub fn new(repositories: Arc<R>, jwt: JwtConfig) -> Self {
        Self::from_parts(
            repositories,
            jwt,
            LoginGuardConfig::default(),
            SecurityConfig::default(),
            Arc::new(videmaison_core::services::NoopMailerService),
            Arc::new(NoopPushChannel),
        )
    }

    pub(crate) fn from_parts(
        repositories: Arc<R>,
        jwt: JwtConfig,
        login_guard: LoginGuardConfig,
        security: SecurityConfig,
        mailer: Arc<dyn MailerService>,
        push: Arc<dyn PushChannel>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::new(jwt));
        let users = Arc::new(UserRepositoryAdapter::new(repositories.clone()));

        Self {
            auth: Arc::new(AuthService::new(users, tokens.clone(), login_guard)),
            service_requests: Arc::new(ServiceRequestService::new(
                Arc::new(ServiceRequestRepositoryAdapter::new(repositories.clone())),
                mailer,
                push.clone(),
            )),
            chat: Arc::new(ChatService::new(
                Arc::new(ChatRepositoryAdapter::new(repositories.clone())),
                push,
            )),
            security: Arc::new(SecurityState::new(security)),
            tokens,
            repositories,
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    pub fn repositories(&self) -> &Arc<R> {
        &self.repositories
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn auth(&self) -> &AuthService<Users<R>> {
        &self.auth
    }

    pub fn service_requests(&self) -> &ServiceRequestService<ServiceRequests<R>> {
        &self.service_requests
    }

    pub fn chat(&self) -> &ChatService<ChatMessages<R>> {
        &self.chat
    }

    pub fn security(&self) -> &SecurityState {
        &self.security
    }

    /// Starts the hourly cleanup of the in-memory security stores.
    pub fn start_background_tasks(&self, shutdown: Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.security.start_cleanup_tasks(shutdown)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    const PASSWORD: &str = "Sturdy-Password-42!";

    async fn app() -> VideMaison<SqliteRepositoryProvider> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let app = VideMaison::new(
            Arc::new(SqliteRepositoryProvider::new(pool)),
            JwtConfig::new_hs256(b"facade-test-secret".to_vec()),
        );
        app.migrate().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_register_login_and_profile() {
        let app = app().await;
        let user = app
            .auth()
            .register("client@example.be", PASSWORD, Some("Jan"), None)
            .await
            .unwrap();

        let outcome = app.auth().login("client@example.be", PASSWORD).await.unwrap();
        let claims = app.tokens().verify_access(&outcome.access_token).unwrap();
        assert_eq!(claims.user_id(), user.id);

        let profile = app.auth().profile(&claims.user_id()).await.unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Jan"));
        assert!(profile.last_login.is_some());
    }

    #[tokio::test]
    async fn test_lockout_persists_across_service_instances() {
        let app = app().await;
        app.auth()
            .register("client@example.be", PASSWORD, None, None)
            .await
            .unwrap();
        for _ in 0..5 {
            app.auth()
                .login("client@example.be", "Not-The-Password-1!")
                .await
                .unwrap_err();
        }

        let err = app.auth().login("client@example.be", PASSWORD).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(videmaison_core::error::AuthError::AccountLocked { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_and_list_requests() {
        let app = app().await;
        let form = NewServiceRequest {
            name: Some("Sophie".to_string()),
            email: Some("sophie@example.be".to_string()),
            phone: Some("0470 11 22 33".to_string()),
            address: Some("Place Flagey 3, Ixelles".to_string()),
            service_type: Some("nettoyage".to_string()),
            message: Some("Nettoyage après déménagement".to_string()),
            language: Some("fr".to_string()),
        };
        let request = app.service_requests().submit(form).await.unwrap();

        let page = app.service_requests().list(1, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.requests[0].id, request.id);
        assert_eq!(app.service_requests().unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        app().await.health_check().await.unwrap();
    }
}
