//! In-memory storage that keeps the same JSON documents a file would.
//!
//! Documents are stored serialized, so everything that goes through
//! `MemoryStorage` is exercised by the real encoders, and tests can edit
//! the raw text to simulate corruption.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::auth::AuthRecords;
use crate::errors::{CredVaultError, Result};
use crate::vault::VaultContainer;

use super::{validate_name, Storage};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    auth_json: RefCell<Option<String>>,
    vaults: RefCell<BTreeMap<(String, String), String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON text of a vault container, if any.
    pub fn raw_container(&self, user: &str, vault_name: &str) -> Option<String> {
        self.vaults
            .borrow()
            .get(&(user.to_string(), vault_name.to_string()))
            .cloned()
    }

    /// Replace the stored JSON text of a vault container.
    pub fn set_raw_container(&self, user: &str, vault_name: &str, json: String) {
        self.vaults
            .borrow_mut()
            .insert((user.to_string(), vault_name.to_string()), json);
    }

    /// The stored JSON text of the auth records, if any.
    pub fn raw_auth_records(&self) -> Option<String> {
        self.auth_json.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn load_auth_records(&self) -> Result<AuthRecords> {
        match self.auth_json.borrow().as_deref() {
            Some(json) => AuthRecords::from_json(json),
            None => Ok(AuthRecords::new()),
        }
    }

    fn save_auth_records(&self, records: &AuthRecords) -> Result<()> {
        *self.auth_json.borrow_mut() = Some(records.to_json()?);
        Ok(())
    }

    fn load_vault_container(&self, user: &str, vault_name: &str) -> Result<VaultContainer> {
        validate_name("username", user)?;
        validate_name("vault name", vault_name)?;
        let json = self
            .raw_container(user, vault_name)
            .ok_or_else(|| CredVaultError::VaultNotFound(vault_name.to_string()))?;
        VaultContainer::from_json(&json)
    }

    fn save_vault_container(
        &self,
        user: &str,
        vault_name: &str,
        container: &VaultContainer,
    ) -> Result<()> {
        validate_name("username", user)?;
        validate_name("vault name", vault_name)?;
        self.set_raw_container(user, vault_name, container.to_json()?);
        Ok(())
    }

    fn list_vault_names(&self, user: &str) -> Result<Vec<String>> {
        validate_name("username", user)?;
        Ok(self
            .vaults
            .borrow()
            .keys()
            .filter(|(owner, _)| owner == user)
            .map(|(_, name)| name.clone())
            .collect())
    }
}
