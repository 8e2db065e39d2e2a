//! Service layer for business logic.
//!
//! Services are generic over the repository traits they need and hold them
//! behind `Arc`, so the facade can share one storage provider between them.

pub mod auth;
pub mod chat;
pub mod mailer;
pub mod service_request;

pub use auth::{AuthService, LoginOutcome};
pub use chat::ChatService;
pub use mailer::{MailerService, NoopMailerService};
pub use service_request::ServiceRequestService;

#[cfg(feature = "mailer")]
pub use mailer::VideMaisonMailerService;
