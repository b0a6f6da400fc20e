//! Stable error codes returned by the sign-in and sign-up flows.
//!
//! Every failure the facade reports is one [`ErrorCode`]. The numeric code and
//! the machine name are part of the public contract and never change; the human
//! message may.
use serde::Serialize;
use sesame_core::{AuthError, CredentialError, Error, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InstanceNotConfigured,
    InvalidEmail,
    EmailRequired,
    SignupDisabled,
    MagicLinkLoginDisabled,
    UserAccountDeactivated,
    UserAlreadyExist,
    MagicSignUpEmailCodeRequired,
    UserDoesNotExist,
    MagicSignInEmailCodeRequired,
    InvalidMagicCodeSignIn,
    InvalidMagicCodeSignUp,
    ExpiredMagicCodeSignIn,
    ExpiredMagicCodeSignUp,
    EmailCodeAttemptExhaustedSignIn,
    EmailCodeAttemptExhaustedSignUp,
    AuthenticationFailed,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 17] = [
        ErrorCode::InstanceNotConfigured,
        ErrorCode::InvalidEmail,
        ErrorCode::EmailRequired,
        ErrorCode::SignupDisabled,
        ErrorCode::MagicLinkLoginDisabled,
        ErrorCode::UserAccountDeactivated,
        ErrorCode::UserAlreadyExist,
        ErrorCode::MagicSignUpEmailCodeRequired,
        ErrorCode::UserDoesNotExist,
        ErrorCode::MagicSignInEmailCodeRequired,
        ErrorCode::InvalidMagicCodeSignIn,
        ErrorCode::InvalidMagicCodeSignUp,
        ErrorCode::ExpiredMagicCodeSignIn,
        ErrorCode::ExpiredMagicCodeSignUp,
        ErrorCode::EmailCodeAttemptExhaustedSignIn,
        ErrorCode::EmailCodeAttemptExhaustedSignUp,
        ErrorCode::AuthenticationFailed,
    ];

    pub fn code(&self) -> u32 {
        match self {
            ErrorCode::InstanceNotConfigured => 5000,
            ErrorCode::InvalidEmail => 5005,
            ErrorCode::EmailRequired => 5010,
            ErrorCode::SignupDisabled => 5015,
            ErrorCode::MagicLinkLoginDisabled => 5016,
            ErrorCode::UserAccountDeactivated => 5019,
            ErrorCode::UserAlreadyExist => 5030,
            ErrorCode::MagicSignUpEmailCodeRequired => 5055,
            ErrorCode::UserDoesNotExist => 5060,
            ErrorCode::MagicSignInEmailCodeRequired => 5085,
            ErrorCode::InvalidMagicCodeSignIn => 5090,
            ErrorCode::InvalidMagicCodeSignUp => 5092,
            ErrorCode::ExpiredMagicCodeSignIn => 5095,
            ErrorCode::ExpiredMagicCodeSignUp => 5097,
            ErrorCode::EmailCodeAttemptExhaustedSignIn => 5100,
            ErrorCode::EmailCodeAttemptExhaustedSignUp => 5102,
            ErrorCode::AuthenticationFailed => 5999,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::InstanceNotConfigured => "INSTANCE_NOT_CONFIGURED",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::EmailRequired => "EMAIL_REQUIRED",
            ErrorCode::SignupDisabled => "SIGNUP_DISABLED",
            ErrorCode::MagicLinkLoginDisabled => "MAGIC_LINK_LOGIN_DISABLED",
            ErrorCode::UserAccountDeactivated => "USER_ACCOUNT_DEACTIVATED",
            ErrorCode::UserAlreadyExist => "USER_ALREADY_EXIST",
            ErrorCode::MagicSignUpEmailCodeRequired => "MAGIC_SIGN_UP_EMAIL_CODE_REQUIRED",
            ErrorCode::UserDoesNotExist => "USER_DOES_NOT_EXIST",
            ErrorCode::MagicSignInEmailCodeRequired => "MAGIC_SIGN_IN_EMAIL_CODE_REQUIRED",
            ErrorCode::InvalidMagicCodeSignIn => "INVALID_MAGIC_CODE_SIGN_IN",
            ErrorCode::InvalidMagicCodeSignUp => "INVALID_MAGIC_CODE_SIGN_UP",
            ErrorCode::ExpiredMagicCodeSignIn => "EXPIRED_MAGIC_CODE_SIGN_IN",
            ErrorCode::ExpiredMagicCodeSignUp => "EXPIRED_MAGIC_CODE_SIGN_UP",
            ErrorCode::EmailCodeAttemptExhaustedSignIn => "EMAIL_CODE_ATTEMPT_EXHAUSTED_SIGN_IN",
            ErrorCode::EmailCodeAttemptExhaustedSignUp => "EMAIL_CODE_ATTEMPT_EXHAUSTED_SIGN_UP",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InstanceNotConfigured => "The instance is not configured yet.",
            ErrorCode::InvalidEmail => "The email address is not valid.",
            ErrorCode::EmailRequired => "An email address is required.",
            ErrorCode::SignupDisabled => "New accounts cannot be created on this instance.",
            ErrorCode::MagicLinkLoginDisabled => "Sign in with a magic code is disabled.",
            ErrorCode::UserAccountDeactivated => "This account has been deactivated.",
            ErrorCode::UserAlreadyExist => "An account with this email already exists.",
            ErrorCode::MagicSignUpEmailCodeRequired => "Both email and code are required to sign up.",
            ErrorCode::UserDoesNotExist => "User could not be found with the given email.",
            ErrorCode::MagicSignInEmailCodeRequired => "Both email and code are required to sign in.",
            ErrorCode::InvalidMagicCodeSignIn | ErrorCode::InvalidMagicCodeSignUp => {
                "The code is not valid. Request a new one."
            }
            ErrorCode::ExpiredMagicCodeSignIn | ErrorCode::ExpiredMagicCodeSignUp => {
                "The code has expired. Request a new one."
            }
            ErrorCode::EmailCodeAttemptExhaustedSignIn
            | ErrorCode::EmailCodeAttemptExhaustedSignUp => {
                "Too many codes were requested. Try again later."
            }
            ErrorCode::AuthenticationFailed => "Authentication failed.",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The wire form of an error: `{"error_code": "5060", "error_message": "USER_DOES_NOT_EXIST"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDict {
    pub error_code: String,
    pub error_message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{code} ({}): {}", .code.code(), .code.message())]
pub struct SesameError {
    pub code: ErrorCode,
}

impl SesameError {
    pub fn new(code: ErrorCode) -> Self {
        Self { code }
    }

    pub fn error_dict(&self) -> ErrorDict {
        ErrorDict {
            error_code: self.code.code().to_string(),
            error_message: self.code.name(),
        }
    }
}

impl From<ErrorCode> for SesameError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Which entry point an error came from; several core errors map to different
/// codes for sign-in and sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Generate,
    SignIn,
    SignUp,
}

impl Flow {
    fn email_code_required(self) -> ErrorCode {
        match self {
            Flow::SignUp => ErrorCode::MagicSignUpEmailCodeRequired,
            Flow::SignIn => ErrorCode::MagicSignInEmailCodeRequired,
            Flow::Generate => ErrorCode::EmailRequired,
        }
    }

    fn invalid_code(self) -> ErrorCode {
        match self {
            Flow::SignUp => ErrorCode::InvalidMagicCodeSignUp,
            Flow::SignIn | Flow::Generate => ErrorCode::InvalidMagicCodeSignIn,
        }
    }

    fn expired_code(self) -> ErrorCode {
        match self {
            Flow::SignUp => ErrorCode::ExpiredMagicCodeSignUp,
            Flow::SignIn | Flow::Generate => ErrorCode::ExpiredMagicCodeSignIn,
        }
    }

    fn attempts_exhausted(self) -> ErrorCode {
        match self {
            Flow::SignUp => ErrorCode::EmailCodeAttemptExhaustedSignUp,
            Flow::SignIn | Flow::Generate => ErrorCode::EmailCodeAttemptExhaustedSignIn,
        }
    }

    /// Map a core error onto the code reported for this flow.
    pub(crate) fn map(self, error: Error) -> SesameError {
        let code = match &error {
            Error::Credential(reason) => match reason {
                CredentialError::NotFound
                | CredentialError::AlreadyConsumed
                | CredentialError::Mismatch => self.invalid_code(),
                CredentialError::Expired => self.expired_code(),
                CredentialError::AttemptsExhausted => self.attempts_exhausted(),
            },
            Error::Validation(ValidationError::MissingField(_)) => self.email_code_required(),
            Error::Validation(ValidationError::InvalidEmail(_)) => ErrorCode::InvalidEmail,
            Error::Auth(AuthError::UserNotFound) => ErrorCode::UserDoesNotExist,
            Error::Auth(AuthError::UserAlreadyExists) => ErrorCode::UserAlreadyExist,
            Error::Auth(AuthError::AccountDeactivated) => ErrorCode::UserAccountDeactivated,
            _ => ErrorCode::AuthenticationFailed,
        };

        match code {
            ErrorCode::AuthenticationFailed => {
                tracing::error!(error = %error, flow = ?self, "Magic code flow failed");
            }
            _ => {
                tracing::debug!(error = %error, flow = ?self, code = %code, "Magic code flow rejected");
            }
        }

        SesameError::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sesame_core::StorageError;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<u32> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        let names: HashSet<&str> = ErrorCode::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(codes.len(), ErrorCode::ALL.len());
        assert_eq!(names.len(), ErrorCode::ALL.len());

        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(1234), None);
    }

    #[test]
    fn test_error_dict() {
        let error = SesameError::new(ErrorCode::UserDoesNotExist);
        let dict = error.error_dict();

        assert_eq!(dict.error_code, "5060");
        assert_eq!(dict.error_message, "USER_DOES_NOT_EXIST");
        assert_eq!(
            serde_json::to_value(&dict).unwrap(),
            serde_json::json!({"error_code": "5060", "error_message": "USER_DOES_NOT_EXIST"})
        );
    }

    #[test]
    fn test_credential_errors_per_flow() {
        assert_eq!(
            Flow::SignIn.map(CredentialError::Expired.into()).code,
            ErrorCode::ExpiredMagicCodeSignIn
        );
        assert_eq!(
            Flow::SignUp.map(CredentialError::Expired.into()).code,
            ErrorCode::ExpiredMagicCodeSignUp
        );
        assert_eq!(
            Flow::SignIn.map(CredentialError::Mismatch.into()).code,
            ErrorCode::InvalidMagicCodeSignIn
        );
        assert_eq!(
            Flow::SignUp.map(CredentialError::AlreadyConsumed.into()).code,
            ErrorCode::InvalidMagicCodeSignUp
        );
        assert_eq!(
            Flow::Generate.map(CredentialError::AttemptsExhausted.into()).code,
            ErrorCode::EmailCodeAttemptExhaustedSignIn
        );
    }

    #[test]
    fn test_validation_and_storage_errors() {
        let missing = || Error::from(ValidationError::MissingField("Email is required".into()));

        assert_eq!(Flow::Generate.map(missing()).code, ErrorCode::EmailRequired);
        assert_eq!(
            Flow::SignIn.map(missing()).code,
            ErrorCode::MagicSignInEmailCodeRequired
        );
        assert_eq!(
            Flow::SignUp.map(missing()).code,
            ErrorCode::MagicSignUpEmailCodeRequired
        );
        assert_eq!(
            Flow::Generate
                .map(ValidationError::InvalidEmail("nope".into()).into())
                .code,
            ErrorCode::InvalidEmail
        );
        assert_eq!(
            Flow::SignIn
                .map(StorageError::Database("disk full".into()).into())
                .code,
            ErrorCode::AuthenticationFailed
        );
    }

    #[test]
    fn test_account_errors() {
        assert_eq!(
            Flow::SignIn.map(AuthError::UserNotFound.into()).code,
            ErrorCode::UserDoesNotExist
        );
        assert_eq!(
            Flow::SignIn.map(AuthError::AccountDeactivated.into()).code,
            ErrorCode::UserAccountDeactivated
        );
        assert_eq!(
            Flow::SignUp.map(AuthError::UserAlreadyExists.into()).code,
            ErrorCode::UserAlreadyExist
        );
    }
}
