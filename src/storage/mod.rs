//! Persistence for authentication records and vault containers.
//!
//! The services only talk to the [`Storage`] trait.  Errors from a backend
//! (I/O, bad names, malformed documents) are passed through unchanged.
//!
//! - [`FileStorage`]: JSON files under a data directory, written atomically.
//! - [`MemoryStorage`]: the same documents kept in memory.

pub mod file;
pub mod memory;

use crate::auth::AuthRecords;
use crate::errors::{CredVaultError, Result};
use crate::vault::VaultContainer;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Maximum length of a username or vault name.
const MAX_NAME_LEN: usize = 64;

/// Backend for the authentication file and per-user vault containers.
pub trait Storage {
    /// Load every auth record.  A missing store is an empty collection.
    fn load_auth_records(&self) -> Result<AuthRecords>;

    /// Replace the whole auth record collection.
    fn save_auth_records(&self, records: &AuthRecords) -> Result<()>;

    /// Load one vault container.  `VaultNotFound` if it does not exist.
    fn load_vault_container(&self, user: &str, vault_name: &str) -> Result<VaultContainer>;

    /// Create or overwrite one vault container.
    fn save_vault_container(
        &self,
        user: &str,
        vault_name: &str,
        container: &VaultContainer,
    ) -> Result<()>;

    /// Names of all vaults belonging to `user`, sorted.
    fn list_vault_names(&self, user: &str) -> Result<Vec<String>>;
}

/// Validate that a username or vault name is safe to use as a path component.
///
/// Allowed: ASCII letters, digits, underscores and hyphens.  Must be
/// non-empty and at most 64 characters.
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value.len() <= MAX_NAME_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid {
        Ok(())
    } else {
        Err(CredVaultError::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}
