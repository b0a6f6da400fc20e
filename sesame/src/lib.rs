//! # Sesame
//!
//! Passwordless sign-in and sign-up with one-time magic codes.
//!
//! A visitor asks for a code with their email, receives it out of band, and
//! trades it for a session. [`Sesame`] wires the pieces from `sesame-core`
//! together and reports every failure as one stable [`ErrorCode`]:
//!
//! - [`Sesame::magic_generate`] issues a code and queues it for delivery.
//! - [`Sesame::magic_sign_in`] redeems a code for an existing account.
//! - [`Sesame::magic_sign_up`] redeems a code and creates the account.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sesame::{RequestMetadata, SesameBuilder};
//! use sesame_core::services::{MagicCodeDispatcher, MagicCodeMessage};
//! use std::sync::Arc;
//!
//! struct PrintDispatcher;
//!
//! impl MagicCodeDispatcher for PrintDispatcher {
//!     fn dispatch(&self, message: MagicCodeMessage) {
//!         println!("code for {}: {}", message.email, message.code);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sesame = SesameBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_dispatcher(Arc::new(PrintDispatcher))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let issued = sesame
//!         .magic_generate("ada@example.com", "https://example.com")
//!         .await?;
//!     println!("key: {}", issued.identifier);
//!
//!     Ok(())
//! }
//! ```
mod builder;
mod config;
mod error;

use std::sync::Arc;

use sesame_core::{
    AuthError, Error, RepositoryProvider,
    repositories::{CredentialRepositoryAdapter, SessionRepositoryAdapter, UserRepositoryAdapter},
    services::{MagicAuthService, MagicCodeDispatcher, MagicCodeService, SessionService, UserService},
    validation::{normalize_email, validate_email},
};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
};

pub use builder::{NoStorage, SesameBuilder, SesameBuilderError, WithStorage};
pub use config::{InstanceConfig, SesameConfig, SessionConfig};
pub use error::{ErrorCode, ErrorDict, SesameError};

use error::Flow;

pub use sesame_core::{IssuedIdentifier, RequestMetadata, Session, SessionToken, User, UserId};

#[cfg(feature = "sqlite")]
pub use sesame_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "mailer")]
pub use sesame_mailer::MailerConfig;

/// A completed sign-in.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub user: User,
    pub session: Session,
    /// The account was created by a magic code and has finished onboarding
    /// without choosing a password.
    pub requires_password_setup: bool,
}

/// A completed sign-up.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: User,
    pub session: Session,
}

/// Background tasks owned by a [`Sesame`] instance.
#[derive(Default)]
struct Background {
    shutdown: Option<watch::Sender<bool>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// The magic-code authentication coordinator.
///
/// Built with [`SesameBuilder`] or directly with [`Sesame::new`] from a
/// repository provider and a dispatcher.
pub struct Sesame<R: RepositoryProvider> {
    repositories: Arc<R>,
    magic_codes: Arc<MagicCodeService<CredentialRepositoryAdapter<R>>>,
    magic_auth: MagicAuthService<CredentialRepositoryAdapter<R>, UserRepositoryAdapter<R>>,
    user_service: UserService<UserRepositoryAdapter<R>>,
    session_service: SessionService<SessionRepositoryAdapter<R>>,
    config: SesameConfig,
    background: Background,
}

impl<R: RepositoryProvider> Sesame<R> {
    pub fn new(
        repositories: Arc<R>,
        dispatcher: Arc<dyn MagicCodeDispatcher>,
        config: SesameConfig,
    ) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let session_repo = Arc::new(SessionRepositoryAdapter::new(repositories.clone()));
        let credential_repo = Arc::new(CredentialRepositoryAdapter::new(repositories.clone()));

        let magic_codes = Arc::new(MagicCodeService::new(
            credential_repo,
            config.magic_code.clone(),
        ));

        Self {
            repositories,
            magic_auth: MagicAuthService::new(magic_codes.clone(), user_repo.clone(), dispatcher),
            magic_codes,
            user_service: UserService::new(user_repo),
            session_service: SessionService::new(session_repo),
            config,
            background: Background::default(),
        }
    }

    /// Take ownership of tasks that should stop with this instance.
    pub(crate) fn with_background(
        mut self,
        shutdown: watch::Sender<bool>,
        handles: Vec<JoinHandle<()>>,
    ) -> Self {
        self.background = Background {
            shutdown: Some(shutdown),
            handles: Mutex::new(handles),
        };
        self
    }

    pub fn config(&self) -> &SesameConfig {
        &self.config
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Issue a magic code for `email` and queue it for delivery to `origin`'s users.
    ///
    /// Works whether or not an account exists for `email`; the check happens
    /// when the code is redeemed.
    pub async fn magic_generate(
        &self,
        email: &str,
        origin: &str,
    ) -> Result<IssuedIdentifier, SesameError> {
        self.check_instance()?;
        if !self.config.instance.magic_login_enabled {
            return Err(ErrorCode::MagicLinkLoginDisabled.into());
        }

        self.magic_auth
            .initiate(email, origin)
            .await
            .map_err(|e| Flow::Generate.map(e))
    }

    /// Redeem a code for an existing account and bind a session.
    pub async fn magic_sign_in(
        &self,
        email: &str,
        code: &str,
        metadata: RequestMetadata,
    ) -> Result<SignInOutcome, SesameError> {
        let flow = Flow::SignIn;
        self.check_instance()?;

        let email = normalize_email(email);
        if email.is_empty() || code.trim().is_empty() {
            return Err(ErrorCode::MagicSignInEmailCodeRequired.into());
        }
        validate_email(&email).map_err(|e| flow.map(e.into()))?;

        // The account must exist before the code is touched.
        let user = self
            .user_service
            .get_user_by_email(&email)
            .await
            .map_err(|e| flow.map(e))?
            .ok_or_else(|| flow.map(AuthError::UserNotFound.into()))?;

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Deactivated user attempted magic sign-in");
            return Err(flow.map(AuthError::AccountDeactivated.into()));
        }

        let identity = self
            .magic_auth
            .authenticate(&email, code)
            .await
            .map_err(|e| flow.map(e))?;
        let user = identity
            .user
            .ok_or_else(|| flow.map(AuthError::UserNotFound.into()))?;

        self.user_service
            .ensure_email_verified(&user)
            .await
            .map_err(|e| flow.map(e))?;

        let session = self
            .session_service
            .bind(&user, metadata, self.config.session.expires_in)
            .await
            .map_err(|e| flow.map(e))?;

        tracing::info!(user_id = %user.id, "User signed in with magic code");

        Ok(SignInOutcome {
            requires_password_setup: user.requires_password_setup(),
            user,
            session,
        })
    }

    /// Redeem a code, create the account and bind a session.
    pub async fn magic_sign_up(
        &self,
        email: &str,
        code: &str,
        metadata: RequestMetadata,
    ) -> Result<SignUpOutcome, SesameError> {
        let flow = Flow::SignUp;
        self.check_instance()?;

        let email = normalize_email(email);
        if email.is_empty() || code.trim().is_empty() {
            return Err(ErrorCode::MagicSignUpEmailCodeRequired.into());
        }
        validate_email(&email).map_err(|e| flow.map(e.into()))?;

        // The account must not exist before the code is touched.
        if self
            .user_service
            .get_user_by_email(&email)
            .await
            .map_err(|e| flow.map(e))?
            .is_some()
        {
            return Err(flow.map(AuthError::UserAlreadyExists.into()));
        }

        if !self.config.instance.signup_enabled {
            return Err(ErrorCode::SignupDisabled.into());
        }

        let identity = self
            .magic_auth
            .authenticate(&email, code)
            .await
            .map_err(|e| flow.map(e))?;
        if identity.user.is_some() {
            return Err(flow.map(AuthError::UserAlreadyExists.into()));
        }

        let user = self
            .user_service
            .create_magic_user(&identity.email)
            .await
            .map_err(|e| flow.map(e))?;

        let session = self
            .session_service
            .bind(&user, metadata, self.config.session.expires_in)
            .await
            .map_err(|e| flow.map(e))?;

        tracing::info!(user_id = %user.id, "User signed up with magic code");

        Ok(SignUpOutcome { user, session })
    }

    /// Look up a live session by its token.
    pub async fn get_session(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        self.session_service.get_session(token).await
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// Delete expired magic credentials now.
    pub async fn cleanup_expired(&self) -> Result<u64, Error> {
        self.magic_codes.cleanup_expired().await
    }

    /// Purge expired magic credentials periodically until `shutdown` changes.
    pub fn start_cleanup_task(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        self.magic_codes.start_cleanup_task(shutdown)
    }

    /// Stop the background tasks started by [`SesameBuilder`] and wait for them.
    pub async fn shutdown(&self) {
        if let Some(shutdown) = &self.background.shutdown {
            let _ = shutdown.send(true);
        }

        let handles = std::mem::take(&mut *self.background.handles.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Background task failed during shutdown");
            }
        }
    }

    fn check_instance(&self) -> Result<(), SesameError> {
        if !self.config.instance.is_setup_done {
            return Err(ErrorCode::InstanceNotConfigured.into());
        }
        Ok(())
    }
}
