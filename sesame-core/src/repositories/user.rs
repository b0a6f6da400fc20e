use crate::{
    Error,
    user::{NewUser, User, UserId},
};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user. Fails with a constraint error if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    async fn mark_email_verified(&self, user_id: &UserId) -> Result<(), Error>;
}
