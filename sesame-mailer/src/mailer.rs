use crate::{Email, MailerError};
use async_trait::async_trait;

/// A transport able to hand an [`Email`] to the outside world.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}

#[async_trait]
impl<T: Mailer + ?Sized> Mailer for Box<T> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        (**self).send_email(email).await
    }
}
