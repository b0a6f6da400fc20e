//! Repository implementations for SQLite storage

pub mod credential;
pub mod session;
pub mod user;

pub use credential::SqliteCredentialRepository;
pub use session::SqliteSessionRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use sesame_core::{
    Error, StorageError,
    error::utilities::DatabaseResultExt,
    repositories::{
        CredentialRepositoryProvider, RepositoryProvider, SessionRepositoryProvider,
        UserRepositoryProvider,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// All SQLite repositories over one connection pool.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    session: Arc<SqliteSessionRepository>,
    credential: Arc<SqliteCredentialRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let session = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let credential = Arc::new(SqliteCredentialRepository::new(pool.clone()));

        Self {
            pool,
            user,
            session,
            credential,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl SessionRepositoryProvider for SqliteRepositoryProvider {
    type SessionRepo = SqliteSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl CredentialRepositoryProvider for SqliteRepositoryProvider {
    type CredentialRepo = SqliteCredentialRepository;

    fn credential(&self) -> &Self::CredentialRepo {
        &self.credential
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        use crate::migrations::{SqliteMigrationManager, all};
        use sesame_migration::MigrationManager;

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(e.to_string()))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_db_err()?;
        Ok(())
    }
}
