//! Single-domain views of a [`RepositoryProvider`], so services that are generic
//! over one repository trait can share one provider.
use crate::{
    Error,
    credential::{CredentialKey, MagicCredential},
    repositories::{CredentialRepository, RepositoryProvider, SessionRepository, UserRepository},
    session::{Session, SessionToken},
    user::{NewUser, User, UserId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn mark_email_verified(&self, user_id: &UserId) -> Result<(), Error> {
        self.provider.user().mark_email_verified(user_id).await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        self.provider.session().create(session).await
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        self.provider.session().find_by_token(token).await
    }
}

pub struct CredentialRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> CredentialRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> CredentialRepository for CredentialRepositoryAdapter<R> {
    async fn find(&self, key: &CredentialKey) -> Result<Option<MagicCredential>, Error> {
        self.provider.credential().find(key).await
    }

    async fn store(
        &self,
        credential: &MagicCredential,
        expected_identifier: Option<&str>,
    ) -> Result<bool, Error> {
        self.provider
            .credential()
            .store(credential, expected_identifier)
            .await
    }

    async fn consume(
        &self,
        key: &CredentialKey,
        identifier: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        self.provider.credential().consume(key, identifier, at).await
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.credential().purge_expired(before).await
    }
}
