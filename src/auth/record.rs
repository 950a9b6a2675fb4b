//! Password verifiers stored in the authentication file.
//!
//! The file holds every user of this installation:
//!
//! ```text
//! { "auth_list": [ { "username": "...", "iterations": 100000,
//!                    "salt": "<base64>", "hash": "<base64>" } ] }
//! ```

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{self, Password};
use crate::errors::{CredVaultError, Result};
use crate::vault::format::{base64_decode, base64_encode};

/// One user's password verifier.  Created at signup and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AuthRecord {
    pub username: String,

    pub iterations: u32,

    #[serde(
        alias = "salt_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub salt: Vec<u8>,

    #[serde(
        rename = "hash",
        alias = "hash_base64",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub password_hash: Vec<u8>,
}

impl AuthRecord {
    /// Build a verifier for `password` with a fresh random salt.
    pub fn new(username: &str, password: &Password, iterations: u32) -> Result<Self> {
        let salt = crypto::generate_salt()?;
        let hash = crypto::derive(password.as_bytes(), &salt, iterations)?;

        Ok(Self {
            username: username.to_string(),
            iterations,
            salt: salt.to_vec(),
            password_hash: hash.as_bytes().to_vec(),
        })
    }

    /// Re-derive with the stored salt and iteration count and compare in
    /// constant time.  The candidate hash is wiped on return.
    pub fn verify(&self, password: &Password) -> Result<bool> {
        let candidate = crypto::derive(password.as_bytes(), &self.salt, self.iterations)?;
        Ok(candidate.ct_eq(&self.password_hash))
    }
}

/// The whole authentication file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuthRecords {
    #[serde(default)]
    auth_list: Vec<AuthRecord>,
}

impl AuthRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive lookup.  First match wins.
    pub fn find(&self, username: &str) -> Option<&AuthRecord> {
        self.auth_list.iter().find(|r| r.username == username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.find(username).is_some()
    }

    /// Append a record, refusing a username that is already taken.
    pub fn push(&mut self, record: AuthRecord) -> Result<()> {
        if self.contains(&record.username) {
            return Err(CredVaultError::DuplicateUser(record.username.clone()));
        }
        self.auth_list.push(record);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthRecord> {
        self.auth_list.iter()
    }

    pub fn len(&self) -> usize {
        self.auth_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auth_list.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CredVaultError::SerializationError(format!("auth records: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CredVaultError::SerializationError(format!("auth records: {e}")))
    }
}
