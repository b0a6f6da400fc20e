//! Input validation shared by every entry point.
//!
//! Emails are normalized (trimmed and lower-cased) before they are validated or
//! used to derive a [`CredentialKey`](crate::credential::CredentialKey). Everything
//! downstream assumes the normalized form.
use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// A practical subset of RFC 5322, matched against the normalized address.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("Invalid email regex pattern")
});

const MAX_EMAIL_LENGTH: usize = 254;

/// Trim surrounding whitespace and lower-case the address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an already normalized email address.
///
/// ```rust
/// use sesame_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Normalize then validate, returning the address every other layer should use.
pub fn parse_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    validate_email(&email)?;
    Ok(email)
}
