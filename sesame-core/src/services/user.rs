use crate::{
    Error,
    error::{AuthError, StorageError},
    repositories::UserRepository,
    user::{NewUser, User, UserId},
};
use chrono::Utc;
use std::sync::Arc;

pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// `email` must already be normalized.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository.find_by_email(email).await
    }

    /// Create the account for someone who just proved ownership of `email` with a
    /// magic code: no password chosen yet, email already verified.
    pub async fn create_magic_user(&self, email: &str) -> Result<User, Error> {
        let new_user = NewUser::builder()
            .email(email)
            .is_password_autoset(true)
            .email_verified_at(Some(Utc::now()))
            .build()?;

        match self.repository.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created user from magic code sign-up");
                Ok(user)
            }
            Err(Error::Storage(StorageError::Constraint(_))) => {
                Err(AuthError::UserAlreadyExists.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Record that the user proved ownership of their email, if not already recorded.
    pub async fn ensure_email_verified(&self, user: &User) -> Result<(), Error> {
        if user.is_email_verified() {
            return Ok(());
        }
        self.repository.mark_email_verified(&user.id).await
    }
}
