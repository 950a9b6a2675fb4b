//! The decrypted contents of a vault: its name, signing key and credentials.
//!
//! A `VaultRecord` only ever exists in memory.  It is serialized to JSON
//! just long enough to be sealed, and deserialized from the plaintext that
//! `open` returns.  Credential strings are zeroed when dropped.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::SecretKey;
use crate::errors::{CredVaultError, Result};

use super::format::{key_base64_decode, key_base64_encode};

/// A stored login for one service.
///
/// The password is kept in clear inside the plaintext vault; it is
/// protected by the surrounding encryption only, because it has to be
/// shown back to the user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    pub service_name: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        service_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Case-insensitive match on the service name.
    pub fn matches_service(&self, service_name: &str) -> bool {
        self.service_name
            .chars()
            .flat_map(char::to_lowercase)
            .eq(service_name.chars().flat_map(char::to_lowercase))
    }

    /// Overwrite one field, wiping the previous value.
    pub fn set_field(&mut self, field: CredentialField, value: &str) {
        let slot = match field {
            CredentialField::ServiceName => &mut self.service_name,
            CredentialField::Username => &mut self.username,
            CredentialField::Password => &mut self.password,
        };
        slot.zeroize();
        slot.push_str(value);
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A credential field that can be edited with `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    ServiceName,
    Username,
    Password,
}

impl CredentialField {
    pub const ALL: [CredentialField; 3] = [Self::ServiceName, Self::Username, Self::Password];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceName => "service-name",
            Self::Username => "username",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialField {
    type Err = CredVaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CredVaultError::CommandFailed(format!(
                    "unknown field '{s}', expected one of: service-name, username, password"
                ))
            })
    }
}

/// The plaintext vault document.
#[derive(Serialize, Deserialize)]
pub struct VaultRecord {
    name: String,

    /// MAC key for this vault's container.  Generated once, never changed.
    #[serde(serialize_with = "key_base64_encode", deserialize_with = "key_base64_decode")]
    signing_key: SecretKey,

    #[serde(default)]
    credentials: Vec<Credential>,
}

impl VaultRecord {
    /// A new, empty vault with a freshly generated signing key.
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            signing_key: SecretKey::generate()?,
            credentials: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signing_key(&self) -> &SecretKey {
        &self.signing_key
    }

    /// Credentials in insertion order.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn add(&mut self, credential: Credential) {
        self.credentials.push(credential);
    }

    /// First credential whose service name matches, ignoring case.
    pub fn find(&self, service_name: &str) -> Option<&Credential> {
        self.credentials
            .iter()
            .find(|c| c.matches_service(service_name))
    }

    /// Remove the first case-insensitive match.  Leaves the list untouched
    /// when nothing matches.
    pub fn remove(&mut self, service_name: &str) -> Option<Credential> {
        let index = self
            .credentials
            .iter()
            .position(|c| c.matches_service(service_name))?;
        Some(self.credentials.remove(index))
    }

    /// Change one field of the first matching credential.
    pub fn update(&mut self, service_name: &str, field: CredentialField, value: &str) -> Result<()> {
        let credential = self
            .credentials
            .iter_mut()
            .find(|c| c.matches_service(service_name))
            .ok_or_else(|| CredVaultError::CredentialNotFound(service_name.to_string()))?;
        credential.set_field(field, value);
        Ok(())
    }

    /// Drop every credential, wiping its strings.
    pub fn clear(&mut self) {
        self.credentials.clear();
    }

    /// Serialize to the JSON plaintext that gets sealed.
    ///
    /// The output is measured first so the buffer is allocated once at its
    /// final size and never reallocated (and left unwiped) mid-write.
    pub fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut size = ByteCount(0);
        serde_json::to_writer(&mut size, self).map_err(serialize_error)?;

        let mut buf = Zeroizing::new(Vec::with_capacity(size.0));
        serde_json::to_writer(&mut *buf, self).map_err(serialize_error)?;
        Ok(buf)
    }

    /// Parse decrypted plaintext back into a record.
    pub fn from_plaintext(plaintext: &[u8]) -> Result<Self> {
        serde_json::from_slice(plaintext)
            .map_err(|e| CredVaultError::InvalidVaultFormat(format!("vault record JSON: {e}")))
    }
}

fn serialize_error(e: serde_json::Error) -> CredVaultError {
    CredVaultError::SerializationError(format!("vault record: {e}"))
}

/// Sink that only counts what is written to it.
struct ByteCount(usize);

impl io::Write for ByteCount {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for VaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultRecord")
            .field("name", &self.name)
            .field("signing_key", &self.signing_key)
            .field("credentials", &self.credentials.len())
            .finish()
    }
}
