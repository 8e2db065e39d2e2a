//! # Vide Maison HTTP API
//!
//! Axum routes, extractors and middleware over a [`VideMaison`] instance,
//! plus the WebSocket [`PushHub`] that delivers realtime notifications.
//!
//! ## Routes
//!
//! - `/api/auth/*`: registration and login (each behind its own per-IP
//!   limiter), refresh, profile, logout, CSRF token issuance
//! - `/api/services/*`: the public contact form (general limiter with IP
//!   blocking) and the service catalogue
//! - `/api/admin/*`: request management and dashboard, admin role required
//! - `/api/chat/*`: direct messages between users
//! - `/ws`: push stream, authenticated with `?token=`
//! - `/health`
//!
//! State-changing admin and chat routes also require an `X-CSRF-Token` header
//! obtained from `GET /api/auth/csrf`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use videmaison::{JwtConfig, VideMaisonBuilder};
//! use videmaison_axum::{AppState, PushHub, create_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let push = Arc::new(PushHub::default());
//!     let app = VideMaisonBuilder::new()
//!         .with_sqlite("sqlite://videmaison.db?mode=rwc")
//!         .await?
//!         .with_jwt(JwtConfig::new_hs256(b"change-me".to_vec()))
//!         .with_push_channel(push.clone())
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let router = create_router(AppState::new(Arc::new(app), push));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;
pub mod ws;

pub use error::{ApiError, Result};
pub use extractors::{AdminUser, AuthUser, BearerToken, ClientIp};
pub use middleware::{
    CSRF_HEADER, LimitScope, auth_middleware, limit_general_api, limit_login, limit_registration,
    require_csrf,
};
pub use routes::create_router;
pub use types::{
    CsrfTokenResponse, HealthResponse, LoginRequest, LoginResponse, MessageResponse,
    ProfileResponse, RefreshResponse, RegisterRequest, RegisterResponse, RequestListQuery,
    RequestListResponse, SendMessageRequest, StatusUpdateRequest, SubmitResponse,
    UnreadCountResponse, UserSummary,
};
pub use ws::PushHub;

use std::sync::Arc;

use videmaison::{RepositoryProvider, VideMaison};

/// Shared router state.
pub struct AppState<R: RepositoryProvider> {
    pub app: Arc<VideMaison<R>>,
    pub push: Arc<PushHub>,
}

impl<R: RepositoryProvider> AppState<R> {
    /// `push` must be the same hub the application was built with.
    pub fn new(app: Arc<VideMaison<R>>, push: Arc<PushHub>) -> Self {
        Self { app, push }
    }
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            push: self.push.clone(),
        }
    }
}
