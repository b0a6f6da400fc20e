//! Sessions bound after a successful magic-code exchange.
//!
//! Only the SHA-256 hash of a [`SessionToken`] is persisted. The plaintext token
//! exists in the [`Session`] returned at creation time and in the client's cookie.
use crate::{
    crypto::{generate_secure_token, hash_token, verify_token_hash},
    user::UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque session token with 256 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: &str) -> Self {
        SessionToken(token.to_string())
    }

    pub fn new_random() -> Self {
        SessionToken(generate_secure_token())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// The value stored in place of the token.
    pub fn token_hash(&self) -> String {
        hash_token(&self.0)
    }

    pub fn verify_hash(&self, stored_hash: &str) -> bool {
        verify_token_hash(&self.0, stored_hash)
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client details recorded when a session is bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl RequestMetadata {
    pub fn new(user_agent: Option<String>, ip_address: Option<String>) -> Self {
        Self {
            user_agent,
            ip_address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub user_id: UserId,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
