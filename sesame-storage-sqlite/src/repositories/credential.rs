use crate::{RowError, from_millis};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sesame_core::{
    CredentialKey, Error, MagicCredential, error::utilities::DatabaseResultExt,
    repositories::CredentialRepository,
};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteMagicCredential {
    pub key: String,
    pub identifier: String,
    pub code_hash: String,
    pub issuance: i64,
    pub created_at: i64,
    pub expires_at: i64,
    pub consumed_at: Option<i64>,
}

impl TryFrom<SqliteMagicCredential> for MagicCredential {
    type Error = RowError;

    fn try_from(row: SqliteMagicCredential) -> Result<Self, Self::Error> {
        Ok(MagicCredential {
            key: CredentialKey::from(row.key),
            identifier: row.identifier,
            code_hash: row.code_hash,
            issuance: u32::try_from(row.issuance)
                .map_err(|_| RowError::InvalidIssuance(row.issuance))?,
            created_at: from_millis(row.created_at)?,
            expires_at: from_millis(row.expires_at)?,
            consumed_at: row.consumed_at.map(from_millis).transpose()?,
        })
    }
}

pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn find(&self, key: &CredentialKey) -> Result<Option<MagicCredential>, Error> {
        let row = sqlx::query_as::<_, SqliteMagicCredential>(
            "SELECT * FROM magic_credentials WHERE key = ?1",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        Ok(row.map(MagicCredential::try_from).transpose()?)
    }

    async fn store(
        &self,
        credential: &MagicCredential,
        expected_identifier: Option<&str>,
    ) -> Result<bool, Error> {
        // A NULL expected identifier never matches, so only the insert path can succeed.
        let result = sqlx::query(
            r#"
            INSERT INTO magic_credentials (key, identifier, code_hash, issuance, created_at, expires_at, consumed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(key) DO UPDATE SET
                identifier = excluded.identifier,
                code_hash = excluded.code_hash,
                issuance = excluded.issuance,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at,
                consumed_at = excluded.consumed_at
            WHERE magic_credentials.identifier = ?8
            "#,
        )
        .bind(credential.key.as_str())
        .bind(&credential.identifier)
        .bind(&credential.code_hash)
        .bind(i64::from(credential.issuance))
        .bind(credential.created_at.timestamp_millis())
        .bind(credential.expires_at.timestamp_millis())
        .bind(credential.consumed_at.map(|dt| dt.timestamp_millis()))
        .bind(expected_identifier)
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(result.rows_affected() == 1)
    }

    async fn consume(
        &self,
        key: &CredentialKey,
        identifier: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE magic_credentials
            SET consumed_at = ?1
            WHERE key = ?2 AND identifier = ?3 AND consumed_at IS NULL
            "#,
        )
        .bind(at.timestamp_millis())
        .bind(key.as_str())
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM magic_credentials WHERE expires_at <= ?1")
            .bind(before.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(result.rows_affected())
    }
}
