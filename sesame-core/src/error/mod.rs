pub mod utilities;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User account is deactivated")]
    AccountDeactivated,
}

/// Why a presented magic code was refused.
///
/// Callers show every variant to the end user as the same "invalid or expired
/// code" message. The distinction exists for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("No code has been issued for this key")]
    NotFound,

    #[error("Code has already been used")]
    AlreadyConsumed,

    #[error("Code has expired")]
    Expired,

    #[error("Code does not match")]
    Mismatch,

    #[error("Too many codes requested")]
    AttemptsExhausted,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_credential_error(&self) -> bool {
        matches!(self, Error::Credential(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_delivery_error(&self) -> bool {
        matches!(self, Error::Delivery(_))
    }

    /// The credential failure carried by this error, if any.
    pub fn credential_error(&self) -> Option<CredentialError> {
        match self {
            Error::Credential(e) => Some(*e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let auth_error = Error::Auth(AuthError::UserNotFound);
        assert_eq!(auth_error.to_string(), "Authentication error: User not found");

        let validation_error =
            Error::Validation(ValidationError::InvalidEmail("ada@".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid email format: ada@"
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");

        let credential_error = Error::Credential(CredentialError::Expired);
        assert_eq!(
            credential_error.to_string(),
            "Credential error: Code has expired"
        );
    }

    #[test]
    fn test_credential_error_variants() {
        assert_eq!(
            CredentialError::NotFound.to_string(),
            "No code has been issued for this key"
        );
        assert_eq!(
            CredentialError::AlreadyConsumed.to_string(),
            "Code has already been used"
        );
        assert_eq!(CredentialError::Mismatch.to_string(), "Code does not match");
        assert_eq!(
            CredentialError::AttemptsExhausted.to_string(),
            "Too many codes requested"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Auth(AuthError::UserAlreadyExists).is_auth_error());
        assert!(!Error::Storage(StorageError::NotFound).is_auth_error());

        assert!(Error::Credential(CredentialError::Mismatch).is_credential_error());
        assert!(
            Error::Validation(ValidationError::MissingField("email".to_string()))
                .is_validation_error()
        );
        assert!(Error::Storage(StorageError::Conflict("magic_ada".to_string())).is_storage_error());
        assert!(Error::Delivery("relay refused".to_string()).is_delivery_error());
    }

    #[test]
    fn test_credential_error_accessor() {
        let error: Error = CredentialError::AlreadyConsumed.into();
        assert_eq!(error.credential_error(), Some(CredentialError::AlreadyConsumed));

        let error: Error = AuthError::UserNotFound.into();
        assert_eq!(error.credential_error(), None);
    }
}
