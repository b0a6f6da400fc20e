//! In-process storage on [`DashMap`].
//!
//! Conditional writes go through DashMap's entry and shard locks, so every
//! `store` and `consume` is atomic with respect to other callers in the same
//! process. State is lost on restart; use it for tests and single-node
//! development.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    Error,
    credential::{CredentialKey, MagicCredential},
    error::StorageError,
    repositories::{
        CredentialRepository, CredentialRepositoryProvider, RepositoryProvider,
        SessionRepository, SessionRepositoryProvider, UserRepository, UserRepositoryProvider,
    },
    session::{Session, SessionToken},
    user::{NewUser, User, UserId},
};

#[derive(Default)]
pub struct MemoryCredentialRepository {
    credentials: DashMap<CredentialKey, MagicCredential>,
}

impl MemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn find(&self, key: &CredentialKey) -> Result<Option<MagicCredential>, Error> {
        Ok(self.credentials.get(key).map(|c| c.clone()))
    }

    async fn store(
        &self,
        credential: &MagicCredential,
        expected_identifier: Option<&str>,
    ) -> Result<bool, Error> {
        match self.credentials.entry(credential.key.clone()) {
            Entry::Occupied(mut entry) => {
                if expected_identifier == Some(entry.get().identifier.as_str()) {
                    entry.insert(credential.clone());
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(credential.clone());
                Ok(true)
            }
        }
    }

    async fn consume(
        &self,
        key: &CredentialKey,
        identifier: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        match self.credentials.get_mut(key) {
            Some(mut credential)
                if credential.identifier == identifier && credential.consumed_at.is_none() =>
            {
                credential.consumed_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let mut removed = 0;
        self.credentials.retain(|_, credential| {
            let keep = credential.expires_at > before;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: DashMap<UserId, User>,
    // email -> id, doubles as the uniqueness constraint
    emails: DashMap<String, UserId>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a stored user wholesale. Lets tests and fixtures set flags such as
    /// `is_onboarded` that the sign-in flow only reads.
    pub fn put(&self, user: User) {
        self.emails.insert(user.email.clone(), user.id.clone());
        self.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let now = Utc::now();
        let user = User {
            id: new_user.id,
            email: new_user.email,
            is_active: true,
            is_password_autoset: new_user.is_password_autoset,
            is_onboarded: false,
            email_verified_at: new_user.email_verified_at,
            created_at: now,
            updated_at: now,
        };

        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::Constraint(format!(
                "User with email {} already exists",
                user.email
            ))
            .into()),
            Entry::Vacant(entry) => {
                entry.insert(user.id.clone());
                self.users.insert(user.id.clone(), user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let Some(id) = self.emails.get(email).map(|id| id.clone()) else {
            return Ok(None);
        };
        self.find_by_id(&id).await
    }

    async fn mark_email_verified(&self, user_id: &UserId) -> Result<(), Error> {
        let mut user = self.users.get_mut(user_id).ok_or(StorageError::NotFound)?;
        let now = Utc::now();
        user.email_verified_at = Some(now);
        user.updated_at = now;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionRepository {
    // keyed by token hash
    sessions: DashMap<String, Session>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        let stored = Session {
            token: SessionToken::new(""),
            ..session.clone()
        };

        match self.sessions.entry(session.token_hash.clone()) {
            Entry::Occupied(_) => Err(StorageError::Constraint(
                "Session token already exists".to_string(),
            )
            .into()),
            Entry::Vacant(entry) => {
                entry.insert(stored);
                Ok(session)
            }
        }
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let Some(stored) = self.sessions.get(&token.token_hash()).map(|s| s.clone()) else {
            return Ok(None);
        };

        if !token.verify_hash(&stored.token_hash) {
            return Ok(None);
        }

        Ok(Some(Session {
            token: token.clone(),
            ..stored
        }))
    }
}

/// All in-memory repositories behind one [`RepositoryProvider`].
#[derive(Default)]
pub struct MemoryStorage {
    user: MemoryUserRepository,
    session: MemorySessionRepository,
    credential: MemoryCredentialRepository,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepositoryProvider for MemoryStorage {
    type UserRepo = MemoryUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl SessionRepositoryProvider for MemoryStorage {
    type SessionRepo = MemorySessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl CredentialRepositoryProvider for MemoryStorage {
    type CredentialRepo = MemoryCredentialRepository;

    fn credential(&self) -> &Self::CredentialRepo {
        &self.credential
    }
}

#[async_trait]
impl RepositoryProvider for MemoryStorage {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
