//! Repository traits for the data access layer.
//!
//! Each `*Repository` trait covers one data domain, each `*RepositoryProvider`
//! hands out the implementation for that domain, and [`RepositoryProvider`]
//! combines them with lifecycle methods. Services are generic over these traits
//! so the same logic runs on the in-memory store and on SQLite.

pub mod adapter;
pub mod credential;
pub mod session;
pub mod user;

pub use adapter::{CredentialRepositoryAdapter, SessionRepositoryAdapter, UserRepositoryAdapter};
pub use credential::CredentialRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

pub trait CredentialRepositoryProvider: Send + Sync + 'static {
    type CredentialRepo: CredentialRepository;

    fn credential(&self) -> &Self::CredentialRepo;
}

/// Everything a storage backend provides.
///
/// ```rust,ignore
/// use sesame_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl CredentialRepositoryProvider for MyStorage {
///     type CredentialRepo = MyCredentialRepository;
///     fn credential(&self) -> &Self::CredentialRepo { &self.credentials }
/// }
///
/// // ... UserRepositoryProvider, SessionRepositoryProvider ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider + SessionRepositoryProvider + CredentialRepositoryProvider
{
    async fn migrate(&self) -> Result<(), Error>;

    async fn health_check(&self) -> Result<(), Error>;
}
