//! HMAC-SHA256 tamper evidence over a vault container.
//!
//! The MAC covers the container's metadata and ciphertext in a fixed order:
//!
//! ```text
//! salt || nonce || iterations (u32, big-endian) || ciphertext
//! ```
//!
//! The signing key lives inside the encrypted vault record, so the MAC can
//! only be checked after a successful decryption.  It backs up the AEAD tag
//! and gives a distinct "tampered" signal instead of "wrong password".

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{CredVaultError, Result};

use super::secret::SecretKey;

/// Size of the HMAC-SHA256 output in bytes.
pub const MAC_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(
    signing_key: &SecretKey,
    salt: &[u8],
    nonce: &[u8],
    iterations: u32,
    ciphertext: &[u8],
) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|e| CredVaultError::CipherUnavailable(format!("invalid HMAC key: {e}")))?;

    mac.update(salt);
    mac.update(nonce);
    mac.update(&iterations.to_be_bytes());
    mac.update(ciphertext);
    Ok(mac)
}

/// Compute the container MAC.
pub fn sign(
    signing_key: &SecretKey,
    salt: &[u8],
    nonce: &[u8],
    iterations: u32,
    ciphertext: &[u8],
) -> Result<[u8; MAC_LEN]> {
    let tag = keyed_mac(signing_key, salt, nonce, iterations, ciphertext)?
        .finalize()
        .into_bytes();

    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&tag);
    Ok(out)
}

/// Check a stored MAC in constant time.
///
/// Uses `hmac::Mac::verify_slice`, which never short-circuits on the first
/// differing byte.
pub fn verify(
    expected_mac: &[u8],
    signing_key: &SecretKey,
    salt: &[u8],
    nonce: &[u8],
    iterations: u32,
    ciphertext: &[u8],
) -> bool {
    match keyed_mac(signing_key, salt, nonce, iterations, ciphertext) {
        Ok(mac) => mac.verify_slice(expected_mac).is_ok(),
        Err(_) => false,
    }
}
