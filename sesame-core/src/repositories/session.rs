use crate::{
    Error,
    session::{Session, SessionToken},
};
use async_trait::async_trait;

/// Repository for session data access
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Persist a new session. Only `token_hash` may be written to storage.
    async fn create(&self, session: Session) -> Result<Session, Error>;

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error>;
}
