//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The same derivation serves two purposes: the password verifier stored in
//! the authentication file, and the AES-256 key that seals a vault.  Both
//! store their salt and iteration count next to the output, and both must be
//! re-derived with exactly the stored values.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::errors::{CredVaultError, Result};

use super::random;
use super::secret::SecretKey;

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Iteration count used for new records and vaults unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte key from a password, salt and iteration count.
///
/// The same inputs always produce the same key.  `iterations` comes from
/// storage when verifying an existing record, never from a constant.
pub fn derive(password: &[u8], salt: &[u8], iterations: u32) -> Result<SecretKey> {
    if iterations < 1 {
        return Err(CredVaultError::DerivationError(
            "iteration count must be at least 1".into(),
        ));
    }
    if salt.len() != SALT_LEN {
        return Err(CredVaultError::DerivationError(format!(
            "salt must be {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    // Derive straight into the wipe-on-drop buffer so no stray copy exists.
    let mut key = SecretKey::zeroed();
    pbkdf2_hmac::<Sha256>(password, salt, iterations, key.as_mut_bytes());
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    random::random_bytes()
}
