//! Issuing and redeeming one-time magic codes.
//!
//! [`MagicCodeService::generate`] stores a new credential under a key, replacing
//! whatever was there, and [`MagicCodeService::validate`] redeems it exactly once.
//! Both are linearizable per key without holding locks across awaits:
//!
//! - `generate` reads the current credential and writes the new one only if the
//!   stored identifier is still the one it read. A lost race is retried a few
//!   times before being reported as a conflict.
//! - `validate` consumes through a conditional write on `(key, identifier,
//!   consumed_at IS NULL)`. Of two concurrent redemptions of the same code only
//!   one write can succeed.
//!
//! ```rust,ignore
//! let codes = MagicCodeService::new(repository, MagicCodeConfig::default());
//!
//! let key = CredentialKey::magic("ada@example.com");
//! let issued = codes.generate(&key).await?;
//! // send issued.code out of band, return issued.identifier to the client
//!
//! let credential = codes.validate(&key, "abcd-efgh-ijkl").await?;
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    Error,
    credential::{CredentialKey, IssuedCode, MagicCredential},
    crypto::{generate_magic_code, hash_token, verify_token_hash},
    error::{CredentialError, StorageError, ValidationError},
    id::generate_prefixed_id,
    repositories::CredentialRepository,
};

const MAX_STORE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct MagicCodeConfig {
    /// How long a code can be redeemed after it was issued.
    pub ttl: Duration,
    /// Codes that may be issued for one key while an earlier one is still active.
    pub max_issuances: u32,
    /// How often the background task purges expired credentials.
    pub cleanup_interval: std::time::Duration,
}

impl Default for MagicCodeConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(10),
            max_issuances: 3,
            cleanup_interval: std::time::Duration::from_secs(15 * 60),
        }
    }
}

impl MagicCodeConfig {
    /// Defaults overridden by `SESAME_MAGIC_CODE_TTL_SECS` and
    /// `SESAME_MAGIC_CODE_MAX_ISSUANCES` when set. Both must be positive.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(ttl) = var("SESAME_MAGIC_CODE_TTL_SECS") {
            config.ttl = ttl
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .and_then(Duration::try_seconds)
                .ok_or_else(|| {
                    ValidationError::InvalidField(format!(
                        "SESAME_MAGIC_CODE_TTL_SECS must be a positive number of seconds: {ttl}"
                    ))
                })?;
        }

        if let Some(max) = var("SESAME_MAGIC_CODE_MAX_ISSUANCES") {
            config.max_issuances = max
                .parse::<u32>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| {
                    ValidationError::InvalidField(format!(
                        "SESAME_MAGIC_CODE_MAX_ISSUANCES must be a positive integer: {max}"
                    ))
                })?;
        }

        Ok(config)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_issuances(mut self, max_issuances: u32) -> Self {
        self.max_issuances = max_issuances;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: std::time::Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

pub struct MagicCodeService<R: CredentialRepository> {
    repository: Arc<R>,
    config: MagicCodeConfig,
}

impl<R: CredentialRepository> MagicCodeService<R> {
    pub fn new(repository: Arc<R>, config: MagicCodeConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &MagicCodeConfig {
        &self.config
    }

    /// Issue a new code for `key`, superseding any earlier one.
    ///
    /// Fails with [`CredentialError::AttemptsExhausted`] once `max_issuances`
    /// codes are outstanding for the key. The counter resets when the latest
    /// code expires or is redeemed.
    pub async fn generate(&self, key: &CredentialKey) -> Result<IssuedCode, Error> {
        for _ in 0..MAX_STORE_ATTEMPTS {
            let now = Utc::now();
            let previous = self.repository.find(key).await?;

            let issuance = match &previous {
                Some(previous) if previous.is_active_at(now) => previous.issuance + 1,
                _ => 1,
            };

            if issuance > self.config.max_issuances {
                tracing::debug!(key = %key, issuance, "Magic code issuance limit reached");
                return Err(CredentialError::AttemptsExhausted.into());
            }

            let expires_at = now.checked_add_signed(self.config.ttl).ok_or_else(|| {
                ValidationError::InvalidField(format!(
                    "magic code TTL of {} is out of range",
                    self.config.ttl
                ))
            })?;

            let code = generate_magic_code();
            let credential = MagicCredential {
                key: key.clone(),
                identifier: generate_prefixed_id("mgc"),
                code_hash: hash_token(&code),
                issuance,
                created_at: now,
                expires_at,
                consumed_at: None,
            };

            let expected = previous.as_ref().map(|p| p.identifier.as_str());
            if self.repository.store(&credential, expected).await? {
                tracing::debug!(
                    key = %key,
                    identifier = %credential.identifier,
                    issuance,
                    "Issued magic code"
                );

                return Ok(IssuedCode {
                    identifier: credential.identifier,
                    code,
                    expires_at: credential.expires_at,
                });
            }

            tracing::debug!(key = %key, "Magic credential changed while issuing, retrying");
        }

        Err(StorageError::Conflict(format!("Could not issue a magic code for {key}")).into())
    }

    /// Redeem `code` for `key`.
    ///
    /// Failure reasons are checked in order: nothing stored, already redeemed,
    /// expired, wrong code. On success the returned credential carries its
    /// `consumed_at`.
    pub async fn validate(&self, key: &CredentialKey, code: &str) -> Result<MagicCredential, Error> {
        let now = Utc::now();

        let result = self.check(key, code, now).await;
        if let Err(Error::Credential(reason)) = &result {
            tracing::debug!(key = %key, reason = %reason, "Magic code rejected");
        }
        result
    }

    async fn check(
        &self,
        key: &CredentialKey,
        code: &str,
        now: chrono::DateTime<Utc>,
    ) -> Result<MagicCredential, Error> {
        let credential = self
            .repository
            .find(key)
            .await?
            .ok_or(CredentialError::NotFound)?;

        if credential.is_consumed() {
            return Err(CredentialError::AlreadyConsumed.into());
        }

        if credential.is_expired_at(now) {
            return Err(CredentialError::Expired.into());
        }

        if !verify_token_hash(code, &credential.code_hash) {
            return Err(CredentialError::Mismatch.into());
        }

        if self
            .repository
            .consume(key, &credential.identifier, now)
            .await?
        {
            return Ok(MagicCredential {
                consumed_at: Some(now),
                ..credential
            });
        }

        // Someone else wrote between our read and the consume.
        let reason = match self.repository.find(key).await? {
            Some(current) if current.identifier == credential.identifier => {
                CredentialError::AlreadyConsumed
            }
            Some(_) => CredentialError::Mismatch,
            None => CredentialError::NotFound,
        };

        Err(reason.into())
    }

    /// Delete every credential whose expiry has passed.
    pub async fn cleanup_expired(&self) -> Result<u64, Error> {
        self.repository.purge_expired(Utc::now()).await
    }

    /// Purge expired credentials every `cleanup_interval` until `shutdown` changes.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let period = self.config.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        match repository.purge_expired(Utc::now()).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count, "Purged expired magic credentials");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to purge expired magic credentials");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down magic credential cleanup task");
                        break;
                    }
                }
            }
        })
    }
}
