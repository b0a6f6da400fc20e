//! Secrets at rest.
//!
//! Neither magic codes nor session tokens are stored in plaintext. The store keeps
//! a SHA-256 hex digest and verification compares digests in constant time with
//! `subtle`, so a mismatch leaks nothing about how many leading bytes matched.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{Rng, TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const MAGIC_CODE_GROUPS: usize = 3;
const MAGIC_CODE_GROUP_LEN: usize = 4;

/// Generate a 256-bit random token encoded as URL-safe base64 (43 characters).
///
/// # Panics
///
/// Panics if the OS random number generator fails. There is no sensible way to
/// continue issuing credentials without an entropy source.
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a human-typeable one-time code: `xxxx-xxxx-xxxx`, lower-case ASCII letters.
///
/// Twelve letters give about 56 bits, far beyond what can be guessed inside a
/// ten minute window.
pub fn generate_magic_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(MAGIC_CODE_GROUPS * (MAGIC_CODE_GROUP_LEN + 1));

    for group in 0..MAGIC_CODE_GROUPS {
        if group > 0 {
            code.push('-');
        }
        for _ in 0..MAGIC_CODE_GROUP_LEN {
            code.push(char::from(rng.random_range(b'a'..=b'z')));
        }
    }

    code
}

/// Hex encoded SHA-256 of `token`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash `token` and compare it against `stored_hash` in constant time.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
