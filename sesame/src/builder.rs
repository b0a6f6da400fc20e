//! Builder pattern for constructing Sesame instances
//!
//! Storage has to be chosen before anything else can be configured, which the
//! builder enforces through its type parameter.
//!
//! # Example
//!
//! ```rust,no_run
//! use sesame::{InstanceConfig, SesameBuilder};
//! # use sesame_core::services::{MagicCodeDispatcher, MagicCodeMessage};
//! # use std::sync::Arc;
//! # struct Discard;
//! # impl MagicCodeDispatcher for Discard { fn dispatch(&self, _: MagicCodeMessage) {} }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sesame = SesameBuilder::new()
//!         .with_sqlite("sqlite://sesame.db?mode=rwc")
//!         .await?
//!         .with_instance_config(InstanceConfig::default().signup_enabled(false))
//!         .with_dispatcher(Arc::new(Discard))
//!         .apply_migrations(true)
//!         .start_cleanup(true)
//!         .build()
//!         .await?;
//!
//!     // ...
//!
//!     sesame.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::Duration;
use sesame_core::{
    RepositoryProvider,
    services::{MagicCodeConfig, MagicCodeDispatcher},
};
use tokio::{sync::watch, task::JoinHandle};

use crate::{InstanceConfig, Sesame, SesameConfig};

#[cfg(feature = "mailer")]
use crate::MailerConfig;

/// Errors that can occur when building a Sesame instance.
#[derive(Debug, thiserror::Error)]
pub enum SesameBuilderError {
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[cfg(feature = "mailer")]
    #[error("Mailer configuration failed: {0}")]
    MailerConfiguration(String),
}

/// No storage has been configured yet.
pub struct NoStorage;

/// Storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

pub struct SesameBuilder<Storage> {
    storage: Storage,
    config: SesameConfig,
    dispatcher: Option<Arc<dyn MagicCodeDispatcher>>,
    apply_migrations: bool,
    start_cleanup: bool,
    #[cfg(feature = "mailer")]
    mailer_config: Option<MailerConfig>,
}

impl Default for SesameBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl SesameBuilder<NoStorage> {
    /// Defaults: [`SesameConfig::default`], no migrations, no cleanup task, no delivery.
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            config: SesameConfig::default(),
            dispatcher: None,
            apply_migrations: false,
            start_cleanup: false,
            #[cfg(feature = "mailer")]
            mailer_config: None,
        }
    }

    /// Use any repository provider, for example
    /// [`MemoryStorage`](sesame_core::storage::MemoryStorage) in tests.
    pub fn with_storage<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> SesameBuilder<WithStorage<R>> {
        SesameBuilder {
            storage: WithStorage { repositories },
            config: self.config,
            dispatcher: self.dispatcher,
            apply_migrations: self.apply_migrations,
            start_cleanup: self.start_cleanup,
            #[cfg(feature = "mailer")]
            mailer_config: self.mailer_config,
        }
    }
}

#[cfg(feature = "sqlite")]
impl SesameBuilder<NoStorage> {
    /// Connect to the SQLite database at `url`, e.g. `"sqlite://sesame.db?mode=rwc"`.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<SesameBuilder<WithStorage<crate::SqliteRepositoryProvider>>, SesameBuilderError>
    {
        let pool = sqlx::SqlitePool::connect(url)
            .await
            .map_err(|e| SesameBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_sqlite_pool(pool))
    }

    /// Share an existing SQLite connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> SesameBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_storage(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

impl<R: RepositoryProvider> SesameBuilder<WithStorage<R>> {
    pub fn with_config(mut self, config: SesameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_instance_config(mut self, instance: InstanceConfig) -> Self {
        self.config.instance = instance;
        self
    }

    pub fn with_magic_code_config(mut self, magic_code: MagicCodeConfig) -> Self {
        self.config.magic_code = magic_code;
        self
    }

    /// Default: 30 days
    pub fn with_session_expiry(mut self, duration: Duration) -> Self {
        self.config.session.expires_in = duration;
        self
    }

    /// Hand issued codes to `dispatcher`. Takes precedence over a configured mailer.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn MagicCodeDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Run the storage migrations in [`build`](Self::build). Default: false
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    /// Start the expired-credential cleanup task in [`build`](Self::build). Default: false
    ///
    /// The task runs every `magic_code.cleanup_interval` until [`Sesame::shutdown`].
    pub fn start_cleanup(mut self, start: bool) -> Self {
        self.start_cleanup = start;
        self
    }

    /// Email codes through `sesame-mailer` from a background delivery worker.
    #[cfg(feature = "mailer")]
    pub fn with_mailer(mut self, config: MailerConfig) -> Self {
        self.mailer_config = Some(config);
        self
    }

    /// See [`MailerConfig::from_env`] for the variables read.
    #[cfg(feature = "mailer")]
    pub fn with_mailer_from_env(mut self) -> Result<Self, SesameBuilderError> {
        let config = MailerConfig::from_env()
            .map_err(|e| SesameBuilderError::MailerConfiguration(e.to_string()))?;
        self.mailer_config = Some(config);
        Ok(self)
    }

    pub async fn build(self) -> Result<Sesame<R>, SesameBuilderError> {
        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| SesameBuilderError::Migration(e.to_string()))?;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => {
                #[cfg(feature = "mailer")]
                {
                    let Some(config) = self.mailer_config else {
                        return Err(no_delivery());
                    };
                    let delivery = sesame_core::services::MailerDelivery::new(config)
                        .map_err(|e| SesameBuilderError::MailerConfiguration(e.to_string()))?;
                    let (dispatcher, handle) = sesame_core::services::QueuedDispatcher::spawn(
                        Arc::new(delivery),
                        shutdown_rx.clone(),
                    );
                    handles.push(handle);
                    Arc::new(dispatcher) as Arc<dyn MagicCodeDispatcher>
                }
                #[cfg(not(feature = "mailer"))]
                {
                    return Err(no_delivery());
                }
            }
        };

        let sesame = Sesame::new(self.storage.repositories, dispatcher, self.config);

        if self.start_cleanup {
            handles.push(sesame.start_cleanup_task(shutdown_rx));
        }

        Ok(sesame.with_background(shutdown_tx, handles))
    }
}

fn no_delivery() -> SesameBuilderError {
    SesameBuilderError::InvalidConfiguration(
        "no way to deliver magic codes: set a dispatcher or a mailer".to_string(),
    )
}
