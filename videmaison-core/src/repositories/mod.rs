//! Repository traits for the data access layer.
//!
//! Services depend on the individual `*Repository` traits. A storage backend
//! exposes all of them through [`RepositoryProvider`], and the adapters in
//! [`adapter`] turn a shared provider back into per-domain repositories.

pub mod adapter;
pub mod chat;
pub mod service_request;
pub mod user;

pub use adapter::{ChatRepositoryAdapter, ServiceRequestRepositoryAdapter, UserRepositoryAdapter};
pub use chat::ChatRepository;
pub use service_request::ServiceRequestRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

pub trait ServiceRequestRepositoryProvider: Send + Sync + 'static {
    type ServiceRequestRepo: ServiceRequestRepository;

    fn service_request(&self) -> &Self::ServiceRequestRepo;
}

pub trait ChatRepositoryProvider: Send + Sync + 'static {
    type ChatRepo: ChatRepository;

    fn chat(&self) -> &Self::ChatRepo;
}

#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider + ServiceRequestRepositoryProvider + ChatRepositoryProvider
{
    /// Bring the schema up to date.
    async fn migrate(&self) -> Result<(), Error>;

    async fn health_check(&self) -> Result<(), Error>;
}
