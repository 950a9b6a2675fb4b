//! On-disk vault container and its integrity protocol.
//!
//! A vault is stored as a small JSON document:
//!
//! ```text
//! {
//!   "iterations": 100000,
//!   "salt":       "<base64, 16 bytes>",
//!   "nonce":      "<base64, 12 bytes>",
//!   "ciphertext": "<base64, AES-256-GCM ciphertext + 16-byte tag>",
//!   "mac":        "<base64, HMAC-SHA256 over salt||nonce||iterations||ciphertext>"
//! }
//! ```
//!
//! Sealing: serialize the `VaultRecord`, encrypt it under the password-derived
//! key with a fresh nonce, then MAC the result with the record's signing key.
//!
//! Opening: decrypt first, then verify the MAC with the signing key found
//! inside the plaintext.  The record is only handed back once both pass.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{self, SecretKey, MAC_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::errors::{CredVaultError, Result};

use super::record::VaultRecord;

// ---------------------------------------------------------------------------
// VaultContainer
// ---------------------------------------------------------------------------

/// The encrypted representation of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultContainer {
    /// PBKDF2 iteration count used to derive the vault key.
    pub iterations: u32,

    #[serde(
        alias = "salt_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub salt: Vec<u8>,

    #[serde(
        alias = "iv",
        alias = "iv_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub nonce: Vec<u8>,

    #[serde(
        alias = "ciphertext_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub ciphertext: Vec<u8>,

    #[serde(
        alias = "hash",
        alias = "hash_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub mac: Vec<u8>,
}

impl VaultContainer {
    /// Encrypt `record` under `key` with a freshly generated nonce and sign it.
    pub fn seal(
        record: &VaultRecord,
        key: &SecretKey,
        salt: &[u8; SALT_LEN],
        iterations: u32,
    ) -> Result<Self> {
        let nonce = crypto::generate_nonce()?;
        let plaintext = record.to_plaintext()?;
        let ciphertext = crypto::seal(key, &nonce, &plaintext)?;
        let mac = crypto::sign(record.signing_key(), salt, &nonce, iterations, &ciphertext)?;

        Ok(Self {
            iterations,
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
            mac: mac.to_vec(),
        })
    }

    /// Decrypt and integrity-check the container.
    ///
    /// - `AuthenticationFailure`: the AEAD tag did not verify (wrong key, or
    ///   the ciphertext was altered; the two are indistinguishable here).
    /// - `TamperDetected`: decryption succeeded but the MAC did not verify.
    pub fn open(&self, key: &SecretKey) -> Result<VaultRecord> {
        let nonce = self.nonce_array()?;
        let plaintext = crypto::open(key, &nonce, &self.ciphertext)?;
        let record = VaultRecord::from_plaintext(&plaintext)?;

        if !crypto::verify(
            &self.mac,
            record.signing_key(),
            &self.salt,
            &nonce,
            self.iterations,
            &self.ciphertext,
        ) {
            return Err(CredVaultError::TamperDetected);
        }

        Ok(record)
    }

    /// Check every field has the length the format requires.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(CredVaultError::InvalidVaultFormat(
                "iteration count must be at least 1".into(),
            ));
        }
        check_len("salt", &self.salt, SALT_LEN)?;
        check_len("nonce", &self.nonce, NONCE_LEN)?;
        check_len("mac", &self.mac, MAC_LEN)?;
        if self.ciphertext.len() < TAG_LEN {
            return Err(CredVaultError::InvalidVaultFormat(
                "ciphertext shorter than the authentication tag".into(),
            ));
        }
        Ok(())
    }

    /// The salt as a fixed-size array (after `validate`).
    pub fn salt_array(&self) -> Result<[u8; SALT_LEN]> {
        self.salt
            .as_slice()
            .try_into()
            .map_err(|_| CredVaultError::InvalidVaultFormat("bad salt length".into()))
    }

    fn nonce_array(&self) -> Result<[u8; NONCE_LEN]> {
        self.nonce
            .as_slice()
            .try_into()
            .map_err(|_| CredVaultError::InvalidVaultFormat("bad nonce length".into()))
    }

    /// Pretty-printed JSON, as written to disk.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CredVaultError::SerializationError(format!("vault container: {e}")))
    }

    /// Parse and validate a container document.
    pub fn from_json(json: &str) -> Result<Self> {
        let container: Self = serde_json::from_str(json)
            .map_err(|e| CredVaultError::InvalidVaultFormat(format!("container JSON: {e}")))?;
        container.validate()?;
        Ok(container)
    }
}

fn check_len(field: &str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(CredVaultError::InvalidVaultFormat(format!(
            "{field} must be {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

/// Serialize a key as base64, wiping the intermediate string.
pub(crate) fn key_base64_encode<S>(
    key: &SecretKey,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = Zeroizing::new(BASE64.encode(key.as_bytes()));
    serializer.serialize_str(&encoded)
}

/// Deserialize a base64 key, wiping the intermediate string and bytes.
pub(crate) fn key_base64_decode<'de, D>(deserializer: D) -> std::result::Result<SecretKey, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let encoded = Zeroizing::new(String::deserialize(deserializer)?);
    let bytes = Zeroizing::new(
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)?,
    );
    SecretKey::from_slice(&bytes).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::record::Credential;

    fn sealed() -> (VaultContainer, SecretKey) {
        let key = SecretKey::generate().unwrap();
        let mut record = VaultRecord::new("safe-vault").unwrap();
        record.add(Credential::new("github", "alice99", "hunter2"));
        let container = VaultContainer::seal(&record, &key, &[3u8; SALT_LEN], 1_000).unwrap();
        (container, key)
    }

    #[test]
    fn seal_then_open() {
        let (container, key) = sealed();
        container.validate().unwrap();
        let record = container.open(&key).unwrap();
        assert_eq!(record.find("github").unwrap().password, "hunter2");
    }

    #[test]
    fn wrong_key_is_authentication_failure() {
        let (container, _) = sealed();
        let wrong = SecretKey::generate().unwrap();
        assert!(matches!(
            container.open(&wrong),
            Err(CredVaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn altered_metadata_is_tamper() {
        // Changing the stored iteration count leaves the ciphertext valid
        // under the same key but breaks the MAC.
        let (mut container, key) = sealed();
        container.iterations += 1;
        assert!(matches!(
            container.open(&key),
            Err(CredVaultError::TamperDetected)
        ));
    }

    #[test]
    fn altered_mac_is_tamper() {
        let (mut container, key) = sealed();
        container.mac[0] ^= 0x01;
        assert!(matches!(
            container.open(&key),
            Err(CredVaultError::TamperDetected)
        ));
    }

    #[test]
    fn json_uses_base64_fields() {
        let (container, _) = sealed();
        let json = container.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["iterations"], 1_000);
        assert!(value["salt"].is_string());
        assert!(value["nonce"].is_string());
        assert!(value["mac"].is_string());

        let parsed = VaultContainer::from_json(&json).unwrap();
        assert_eq!(parsed, container);
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let (container, _) = sealed();
        let legacy = serde_json::json!({
            "iterations": container.iterations,
            "salt_base64": BASE64.encode(&container.salt),
            "iv_base64": BASE64.encode(&container.nonce),
            "ciphertext_base64": BASE64.encode(&container.ciphertext),
            "hash_base64": BASE64.encode(&container.mac),
        });
        let parsed = VaultContainer::from_json(&legacy.to_string()).unwrap();
        assert_eq!(parsed, container);
    }

    #[test]
    fn wrong_lengths_fail_validation() {
        let (mut container, _) = sealed();
        container.nonce.pop();
        assert!(matches!(
            container.validate(),
            Err(CredVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn invalid_base64_is_a_format_error() {
        let json = r#"{"iterations":1,"salt":"!!","nonce":"","ciphertext":"","mac":""}"#;
        assert!(matches!(
            VaultContainer::from_json(json),
            Err(CredVaultError::InvalidVaultFormat(_))
        ));
    }
}
