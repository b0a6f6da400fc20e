//! Users as the sign-in flow sees them.
//!
//! | Field                 | Type               | Description                                              |
//! | --------------------- | ------------------ | -------------------------------------------------------- |
//! | `id`                  | `UserId`           | Opaque identifier, `usr_` prefixed.                      |
//! | `email`               | `String`           | Normalized email address, unique.                        |
//! | `is_active`           | `bool`             | Deactivated users cannot sign in.                        |
//! | `is_password_autoset` | `bool`             | The user never chose a password (created by magic code). |
//! | `is_onboarded`        | `bool`             | The user finished onboarding.                            |
//! | `email_verified_at`   | `Option<DateTime>` | When the email was proven by a magic code.               |
//! | `created_at`          | `DateTime`         |                                                          |
//! | `updated_at`          | `DateTime`         |                                                          |
use crate::{
    error::{ValidationError, utilities::RequiredFieldExt},
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub is_active: bool,
    pub is_password_autoset: bool,
    pub is_onboarded: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Users created through a magic code who already finished onboarding are
    /// sent to set a password after signing in.
    pub fn requires_password_setup(&self) -> bool {
        self.is_password_autoset && self.is_onboarded
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    is_active: Option<bool>,
    is_password_autoset: bool,
    is_onboarded: bool,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_password_autoset(mut self, is_password_autoset: bool) -> Self {
        self.is_password_autoset = is_password_autoset;
        self
    }

    pub fn is_onboarded(mut self, is_onboarded: bool) -> Self {
        self.is_onboarded = is_onboarded;
        self
    }

    pub fn email_verified_at(mut self, email_verified_at: Option<DateTime<Utc>>) -> Self {
        self.email_verified_at = email_verified_at;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<User, ValidationError> {
        let now = Utc::now();
        Ok(User {
            id: self.id.unwrap_or_default(),
            email: self.email.require_field("Email")?,
            is_active: self.is_active.unwrap_or(true),
            is_password_autoset: self.is_password_autoset,
            is_onboarded: self.is_onboarded,
            email_verified_at: self.email_verified_at,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// A user about to be inserted. New users are always active and not yet onboarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub is_password_autoset: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
}

impl NewUser {
    pub fn builder() -> NewUserBuilder {
        NewUserBuilder::default()
    }
}

#[derive(Default)]
pub struct NewUserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    is_password_autoset: bool,
    email_verified_at: Option<DateTime<Utc>>,
}

impl NewUserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_password_autoset(mut self, is_password_autoset: bool) -> Self {
        self.is_password_autoset = is_password_autoset;
        self
    }

    pub fn email_verified_at(mut self, email_verified_at: Option<DateTime<Utc>>) -> Self {
        self.email_verified_at = email_verified_at;
        self
    }

    pub fn build(self) -> Result<NewUser, ValidationError> {
        Ok(NewUser {
            id: self.id.unwrap_or_default(),
            email: self.email.require_field("Email")?,
            is_password_autoset: self.is_password_autoset,
            email_verified_at: self.email_verified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id() {
        let id = UserId::new_random();
        assert!(id.is_valid());
        assert!(id.as_str().starts_with("usr_"));
        assert!(!UserId::new("not-an-id").is_valid());
    }

    #[test]
    fn test_user_builder_defaults() {
        let user = User::builder()
            .email("ada@example.com".to_string())
            .build()
            .unwrap();

        assert!(user.is_active);
        assert!(!user.is_password_autoset);
        assert!(!user.is_onboarded);
        assert!(!user.is_email_verified());
        assert!(user.id.is_valid());
    }

    #[test]
    fn test_user_builder_requires_email() {
        assert!(matches!(
            User::builder().build(),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_requires_password_setup() {
        let user = User::builder()
            .email("ada@example.com".to_string())
            .is_password_autoset(true)
            .build()
            .unwrap();
        assert!(!user.requires_password_setup());

        let onboarded = User {
            is_onboarded: true,
            ..user
        };
        assert!(onboarded.requires_password_setup());
    }

    #[test]
    fn test_new_user_builder() {
        let new_user = NewUser::builder()
            .email("ada@example.com")
            .is_password_autoset(true)
            .email_verified_at(Some(Utc::now()))
            .build()
            .unwrap();

        assert_eq!(new_user.email, "ada@example.com");
        assert!(new_user.is_password_autoset);
        assert!(new_user.id.is_valid());
    }
}
