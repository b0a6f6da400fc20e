//! One-time credentials.
//!
//! A [`MagicCredential`] is the stored half of a magic code: the hash of the
//! code, when it expires, and whether it has been used. At most one credential
//! exists per [`CredentialKey`]; issuing a new code replaces the old one.
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scopes a code to a purpose and a subject, e.g. `magic_ada@example.com`.
///
/// The subject must already be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialKey(String);

impl CredentialKey {
    pub const MAGIC_PURPOSE: &'static str = "magic";

    pub fn new(purpose: &str, subject: &str) -> Self {
        CredentialKey(format!("{purpose}_{subject}"))
    }

    /// The key for the magic sign-in code of `email`.
    pub fn magic(email: &str) -> Self {
        Self::new(Self::MAGIC_PURPOSE, email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CredentialKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicCredential {
    pub key: CredentialKey,
    /// Public reference to this particular issuance. Changes every time a code is generated.
    pub identifier: String,
    /// Hex SHA-256 of the code.
    #[serde(skip_serializing, default)]
    pub code_hash: String,
    /// How many codes have been issued for the key in the current window, starting at 1.
    pub issuance: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl MagicCredential {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Neither consumed nor expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_consumed() && !self.is_expired_at(now)
    }
}

/// A freshly generated code. `code` must only travel through the out-of-band channel.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub identifier: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedCode {
    /// Drop the secret, keeping what is safe to hand back to the client.
    pub fn into_identifier(self) -> IssuedIdentifier {
        IssuedIdentifier {
            identifier: self.identifier,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedIdentifier {
    pub identifier: String,
    pub expires_at: DateTime<Utc>,
}

/// Proof that the holder of `email` presented a valid code.
///
/// `user` is `None` when no account exists for the address yet.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub email: String,
    pub identifier: String,
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential(now: DateTime<Utc>) -> MagicCredential {
        MagicCredential {
            key: CredentialKey::magic("ada@example.com"),
            identifier: "mgc_1".to_string(),
            code_hash: "hash".to_string(),
            issuance: 1,
            created_at: now,
            expires_at: now + Duration::minutes(10),
            consumed_at: None,
        }
    }

    #[test]
    fn test_credential_key() {
        assert_eq!(
            CredentialKey::magic("ada@example.com").as_str(),
            "magic_ada@example.com"
        );
        assert_eq!(
            CredentialKey::new("reset", "ada@example.com").to_string(),
            "reset_ada@example.com"
        );
    }

    #[test]
    fn test_credential_state() {
        let now = Utc::now();
        let active = credential(now);
        assert!(active.is_active_at(now));
        assert!(!active.is_active_at(now + Duration::minutes(10)));

        let consumed = MagicCredential {
            consumed_at: Some(now),
            ..credential(now)
        };
        assert!(consumed.is_consumed());
        assert!(!consumed.is_active_at(now));
    }

    #[test]
    fn test_issued_code_into_identifier() {
        let issued = IssuedCode {
            identifier: "mgc_1".to_string(),
            code: "abcd-efgh-ijkl".to_string(),
            expires_at: Utc::now(),
        };

        let public = issued.into_identifier();
        assert_eq!(public.identifier, "mgc_1");
    }
}
