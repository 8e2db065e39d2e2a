//! Core functionality for the Vide Maison backend.
//!
//! This crate holds the domain types ([`User`], [`ServiceRequest`],
//! [`ChatMessage`]), the repository traits storage backends implement, the
//! process-local security state (rate limiters, CSRF store, login lockout) and
//! the services that tie them together.
//!
//! It has no knowledge of HTTP or SQL. The `videmaison` crate wires a storage
//! backend into the services; `videmaison-axum` exposes them over HTTP.
pub mod chat;
pub mod crypto;
pub mod error;
pub mod id;
pub mod push;
pub mod repositories;
pub mod security;
pub mod service_request;
pub mod services;
pub mod session;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::{ChatMessage, MessageId};
pub use error::Error;
pub use push::{NoopPushChannel, PushChannel, PushTarget};
pub use security::{SecurityConfig, SecurityState};
pub use service_request::{
    DashboardStats, NewServiceRequest, RequestPage, RequestStatus, ServiceRequest,
    ServiceRequestId, ServiceType,
};
pub use session::{Claims, JwtConfig, TokenIssuer};
pub use user::{LockState, NewUser, Role, User, UserId};
