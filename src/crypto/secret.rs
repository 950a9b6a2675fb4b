//! Wipe-on-drop containers for passwords and key material.
//!
//! Anything that ever held a password, a derived key, a password hash or a
//! signing key lives in one of these types.  Memory is zeroed when the
//! value is dropped, so every exit path (success, `?` early return,
//! unwinding) leaves nothing behind.  Once dropped the value is gone;
//! there is no way to reuse a wiped buffer.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{CredVaultError, Result};

use super::random;

/// Length of every symmetric key, password hash and signing key (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte secret: a derived vault key, a password hash or a signing key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    /// Wrap raw key bytes.
    ///
    /// `bytes` is copied; the caller is responsible for zeroizing its own copy.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// An all-zero key to be filled in place (e.g. by the KDF).
    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_LEN],
        }
    }

    /// Copy key bytes out of a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(CredVaultError::InvalidVaultFormat(format!(
                "key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Self::zeroed();
        key.bytes.copy_from_slice(bytes);
        Ok(key)
    }

    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut key = Self::zeroed();
        random::fill(&mut key.bytes)?;
        Ok(key)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Constant-time comparison against another byte string.
    ///
    /// Length mismatches compare unequal.
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        self.bytes.as_slice().ct_eq(other).into()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// A password typed by the user.
///
/// Services take `Password` by value so the buffer is wiped as soon as the
/// operation returns, whatever the outcome.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(password: String) -> Self {
        Self(Zeroizing::new(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constant-time equality, used for "confirm password" prompts.
    pub fn ct_eq(&self, other: &Password) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password.to_string())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}
