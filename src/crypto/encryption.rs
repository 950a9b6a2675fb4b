//! AES-256-GCM authenticated encryption.
//!
//! Unlike a self-describing blob, the nonce is supplied by the caller and
//! stored separately in the vault container.  The 16-byte authentication
//! tag is appended to the ciphertext.
//!
//! Layout of a sealed buffer:
//!   [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{CredVaultError, Result};

use super::random;
use super::secret::SecretKey;

/// Size of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

fn cipher(key: &SecretKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CredVaultError::CipherUnavailable(format!("invalid key length: {e}")))
}

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// A nonce must never be reused with the same key; callers get a fresh one
/// from [`generate_nonce`] for every seal.
pub fn seal(key: &SecretKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher(key)?
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CredVaultError::CipherUnavailable(format!("encryption error: {e}")))
}

/// Decrypt and authenticate data produced by [`seal`].
///
/// Any failure (wrong key, flipped byte, truncated input) is reported as
/// the same `AuthenticationFailure`.
pub fn open(
    key: &SecretKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < TAG_LEN {
        return Err(CredVaultError::AuthenticationFailure);
    }

    let plaintext = cipher(key)?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CredVaultError::AuthenticationFailure)?;

    Ok(Zeroizing::new(plaintext))
}

/// Generate a random 96-bit nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    random::random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let key = SecretKey::generate().unwrap();
        let nonce = generate_nonce().unwrap();

        let sealed = seal(&key, &nonce, b"hello").unwrap();
        assert_eq!(sealed.len(), 5 + TAG_LEN);
    }

    #[test]
    fn wrong_nonce_fails() {
        let key = SecretKey::generate().unwrap();
        let nonce = [1u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"payload").unwrap();

        let result = open(&key, &[2u8; NONCE_LEN], &sealed);
        assert!(matches!(result, Err(CredVaultError::AuthenticationFailure)));
    }

    #[test]
    fn truncated_input_fails() {
        let key = SecretKey::generate().unwrap();
        let result = open(&key, &[0u8; NONCE_LEN], &[0u8; 5]);
        assert!(matches!(result, Err(CredVaultError::AuthenticationFailure)));
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = SecretKey::generate().unwrap();
        let nonce = generate_nonce().unwrap();
        let sealed = seal(&key, &nonce, b"").unwrap();
        assert!(open(&key, &nonce, &sealed).unwrap().is_empty());
    }
}
