use crate::{
    Error,
    credential::{CredentialKey, MagicCredential},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage for magic credentials, one row per key.
///
/// Implementations must make `store` and `consume` atomic conditional writes.
/// Both return `false` when the precondition did not hold, leaving the stored
/// credential untouched.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    async fn find(&self, key: &CredentialKey) -> Result<Option<MagicCredential>, Error>;

    /// Write `credential` under its key if the key is vacant or the stored
    /// identifier equals `expected_identifier`. With `None` only a vacant key
    /// can be written.
    async fn store(
        &self,
        credential: &MagicCredential,
        expected_identifier: Option<&str>,
    ) -> Result<bool, Error>;

    /// Set `consumed_at` if the stored credential still has `identifier` and has
    /// not been consumed.
    async fn consume(
        &self,
        key: &CredentialKey,
        identifier: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, Error>;

    /// Delete credentials whose `expires_at` is at or before `before`. Returns how many were removed.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, Error>;
}
