use crate::{
    Error,
    error::ValidationError,
    repositories::SessionRepository,
    session::{RequestMetadata, Session, SessionToken},
    user::User,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Binds a verified user to a new session.
pub struct SessionService<R: SessionRepository> {
    repository: Arc<R>,
}

impl<R: SessionRepository> SessionService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a session for `user`, recording where the request came from.
    pub async fn bind(
        &self,
        user: &User,
        metadata: RequestMetadata,
        expires_in: Duration,
    ) -> Result<Session, Error> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(expires_in).ok_or_else(|| {
            ValidationError::InvalidField(format!("session lifetime of {expires_in} is out of range"))
        })?;
        let token = SessionToken::new_random();
        let session = Session {
            token_hash: token.token_hash(),
            token,
            user_id: user.id.clone(),
            user_agent: metadata.user_agent,
            ip_address: metadata.ip_address,
            created_at: now,
            expires_at,
        };

        let session = self.repository.create(session).await?;
        tracing::debug!(user_id = %session.user_id, "Bound session");
        Ok(session)
    }

    /// Look up a live session. Expired sessions are reported as absent.
    pub async fn get_session(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let session = self.repository.find_by_token(token).await?;
        Ok(session.filter(|s| !s.is_expired()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemorySessionRepository;

    fn user() -> User {
        User::builder()
            .email("ada@example.com".to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_bind_records_metadata() {
        let service = SessionService::new(Arc::new(MemorySessionRepository::new()));
        let user = user();

        let session = service
            .bind(
                &user,
                RequestMetadata::new(Some("Mozilla/5.0".to_string()), Some("10.0.0.1".to_string())),
                Duration::days(7),
            )
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(session.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(session.expires_at - session.created_at, Duration::days(7));

        let found = service.get_session(&session.token).await.unwrap().unwrap();
        assert_eq!(found.user_id, user.id);
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let service = SessionService::new(Arc::new(MemorySessionRepository::new()));

        let session = service
            .bind(&user(), RequestMetadata::default(), Duration::seconds(-1))
            .await
            .unwrap();

        assert!(service.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bind_rejects_overflowing_lifetime() {
        let service = SessionService::new(Arc::new(MemorySessionRepository::new()));

        let result = service
            .bind(&user(), RequestMetadata::default(), Duration::days(1_000_000_000))
            .await;

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidField(_)))
        ));
    }
}
