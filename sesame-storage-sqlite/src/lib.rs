//! SQLite storage backend for sesame.
//!
//! ```rust,ignore
//! use sesame_core::RepositoryProvider;
//! use sesame_storage_sqlite::SqliteRepositoryProvider;
//!
//! let pool = sqlx::SqlitePool::connect("sqlite://sesame.db?mode=rwc").await?;
//! let storage = SqliteRepositoryProvider::new(pool);
//! storage.migrate().await?;
//! ```
//!
//! Timestamps are stored as unix seconds. Session rows hold the token hash, never
//! the token.
pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteCredentialRepository, SqliteRepositoryProvider, SqliteSessionRepository,
    SqliteUserRepository,
};

use chrono::{DateTime, Utc};
use sesame_core::{Error, StorageError};

/// A row that cannot be mapped back onto a domain type.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Invalid issuance count: {0}")]
    InvalidIssuance(i64),
}

impl From<RowError> for Error {
    fn from(e: RowError) -> Self {
        Error::Storage(StorageError::Database(e.to_string()))
    }
}

pub(crate) fn to_datetime(timestamp: i64) -> Result<DateTime<Utc>, RowError> {
    DateTime::from_timestamp(timestamp, 0).ok_or(RowError::InvalidTimestamp(timestamp))
}

pub(crate) fn to_optional_datetime(
    timestamp: Option<i64>,
) -> Result<Option<DateTime<Utc>>, RowError> {
    timestamp.map(to_datetime).transpose()
}

pub(crate) fn from_millis(timestamp: i64) -> Result<DateTime<Utc>, RowError> {
    DateTime::from_timestamp_millis(timestamp).ok_or(RowError::InvalidTimestamp(timestamp))
}
