//! Versioned schema migrations shared by the sqlx storage backends.
//!
//! A backend lists its [`Migration`]s and a [`MigrationManager`] applies the
//! ones not yet recorded in its tracking table, each inside its own transaction.
use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Duplicate migration version: {0}")]
    DuplicateVersion(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique, positive, ordering key.
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix timestamp.
    pub applied_at: i64,
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_sesame_migrations"
    }

    /// Create the tracking table if it does not exist.
    async fn initialize(&self) -> Result<()>;

    /// Apply every migration that has not been applied yet, lowest version first.
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Roll back every applied migration in `migrations`, highest version first.
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;
}

/// Reject migration sets with repeated or non-positive versions.
pub fn check_versions<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    let mut seen = HashSet::new();
    for migration in migrations {
        let version = migration.version();
        if version <= 0 {
            return Err(MigrationError::Migration(format!(
                "{} has non-positive version {version}",
                migration.name()
            )));
        }
        if !seen.insert(version) {
            return Err(MigrationError::DuplicateVersion(version));
        }
    }
    Ok(())
}

/// The migrations from `migrations` missing in `applied`, in ascending version order.
pub fn pending<'a, DB: Database>(
    migrations: &'a [Box<dyn Migration<DB>>],
    applied: &[MigrationRecord],
) -> Vec<&'a dyn Migration<DB>> {
    let applied: HashSet<i64> = applied.iter().map(|r| r.version).collect();
    let mut pending: Vec<&dyn Migration<DB>> = migrations
        .iter()
        .filter(|m| !applied.contains(&m.version()))
        .map(|m| m.as_ref())
        .collect();
    pending.sort_by_key(|m| m.version());
    pending
}
