//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt b64>$<key b64>`. The
//! iteration count travels with the hash so it can be raised later without
//! invalidating existing accounts.
//!
//! Key derivation is CPU-bound. Handlers call the async wrappers, which run the
//! `_sync` functions via `tokio::task::spawn_blocking`.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::AppError;

const SCHEME: &str = "pbkdf2-sha256";
#[cfg(not(test))]
const ITERATIONS: u32 = 210_000;
#[cfg(test)]
const ITERATIONS: u32 = 1_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn hash_password_sync(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, ITERATIONS);
    format!(
        "{SCHEME}${ITERATIONS}${}${}",
        B64.encode(salt),
        B64.encode(key)
    )
}

/// Returns false for a wrong password and for any malformed stored hash.
fn verify_password_sync(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.len() != KEY_LEN {
        return false;
    }
    let actual = derive_key(password, &salt, iterations);
    // constant-time comparison
    actual
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Well-formed hash at the current cost that no password matches. Checked
/// when the account does not exist so both login failures take equally long.
fn dummy_hash() -> String {
    format!(
        "{SCHEME}${ITERATIONS}${}${}",
        B64.encode([0u8; SALT_LEN]),
        B64.encode([0u8; KEY_LEN])
    )
}

pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password_sync(&password))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in hashing: {e}"))
        })
}

/// Verifies `password` against `stored`, or against a dummy hash when there is
/// no account. The latter always yields false.
pub async fn verify_password(password: String, stored: Option<String>) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match stored {
        Some(stored) => verify_password_sync(&password, &stored),
        None => {
            verify_password_sync(&password, &dummy_hash());
            false
        }
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in verification: {e}"))
    })
}
