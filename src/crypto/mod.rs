//! Cryptographic primitives for credvault.
//!
//! This module provides:
//! - Wipe-on-drop password and key containers (`secret`)
//! - OS random bytes for salts, nonces and signing keys (`random`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - HMAC-SHA256 container integrity (`integrity`)

pub mod encryption;
pub mod integrity;
pub mod kdf;
pub mod random;
pub mod secret;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive, ...};
pub use encryption::{generate_nonce, open, seal, NONCE_LEN, TAG_LEN};
pub use integrity::{sign, verify, MAC_LEN};
pub use kdf::{derive, generate_salt, DEFAULT_ITERATIONS, SALT_LEN};
pub use secret::{Password, SecretKey, KEY_LEN};
