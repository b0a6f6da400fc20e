//! The authentication adapter: email in, code out; email and code in, identity out.
//!
//! Whether the subject must or must not already exist is for the caller to
//! decide before calling [`MagicAuthService::authenticate`]. Redemption itself
//! is the same for sign-in and sign-up.

use std::sync::Arc;

use crate::{
    Error,
    credential::{CredentialKey, IssuedIdentifier, VerifiedIdentity},
    error::ValidationError,
    repositories::{CredentialRepository, UserRepository},
    services::{
        dispatch::{MagicCodeDispatcher, MagicCodeMessage},
        magic_code::MagicCodeService,
    },
    validation::{normalize_email, parse_email},
};

pub struct MagicAuthService<C: CredentialRepository, U: UserRepository> {
    codes: Arc<MagicCodeService<C>>,
    users: Arc<U>,
    dispatcher: Arc<dyn MagicCodeDispatcher>,
}

impl<C: CredentialRepository, U: UserRepository> MagicAuthService<C, U> {
    pub fn new(
        codes: Arc<MagicCodeService<C>>,
        users: Arc<U>,
        dispatcher: Arc<dyn MagicCodeDispatcher>,
    ) -> Self {
        Self {
            codes,
            users,
            dispatcher,
        }
    }

    /// Issue a code for `email` and queue it for delivery.
    ///
    /// Only the identifier comes back; the code leaves through the dispatcher.
    pub async fn initiate(&self, email: &str, origin: &str) -> Result<IssuedIdentifier, Error> {
        let email = parse_email(email)?;
        let issued = self.codes.generate(&CredentialKey::magic(&email)).await?;

        self.dispatcher.dispatch(MagicCodeMessage {
            email,
            identifier: issued.identifier.clone(),
            code: issued.code.clone(),
            origin: origin.to_string(),
        });

        Ok(issued.into_identifier())
    }

    /// Redeem `code` for `email` and resolve the account behind it, if any.
    pub async fn authenticate(&self, email: &str, code: &str) -> Result<VerifiedIdentity, Error> {
        let email = normalize_email(email);
        let code = code.trim();

        if email.is_empty() {
            return Err(ValidationError::MissingField("Email is required".to_string()).into());
        }
        if code.is_empty() {
            return Err(ValidationError::MissingField("Code is required".to_string()).into());
        }

        let credential = self.codes.validate(&CredentialKey::magic(&email), code).await?;
        let user = self.users.find_by_email(&email).await?;

        Ok(VerifiedIdentity {
            email,
            identifier: credential.identifier,
            user,
        })
    }
}
