//! Core of sesame: one-time magic codes and the services built on them.
//!
//! - [`credential`] and [`services::magic_code`] implement the credential
//!   lifecycle: issue a code under a key, redeem it exactly once before it expires.
//! - [`services::magic_auth`] turns that into `initiate` / `authenticate` over emails.
//! - [`services::dispatch`] moves codes to the delivery channel off the request path.
//! - [`services::session`] binds a verified user to a session.
//!
//! Storage is abstracted by the traits in [`repositories`]; [`storage::memory`]
//! provides an in-process implementation and `sesame-storage-sqlite` a persistent one.
pub mod credential;
pub mod crypto;
pub mod error;
pub mod id;
pub mod repositories;
pub mod services;
pub mod session;
pub mod storage;
pub mod user;
pub mod validation;

pub use credential::{CredentialKey, IssuedCode, IssuedIdentifier, MagicCredential, VerifiedIdentity};
pub use error::{AuthError, CredentialError, Error, StorageError, ValidationError};
pub use repositories::RepositoryProvider;
pub use session::{RequestMetadata, Session, SessionToken};
pub use user::{NewUser, User, UserId};
