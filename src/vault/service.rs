//! Vault lifecycle: create, unlock, edit in memory, save, close.
//!
//! ```text
//!            unlock ok                      close
//!  Locked ─────────────► Unlocked ─────────────────► Locked
//!    │ 3 wrong passwords          tamper on unlock
//!    ▼                            ─────────────────► Compromised
//!  LockedOut
//! ```
//!
//! `LockedOut` and `Compromised` are terminal for the lifetime of the service.

use tracing::{debug, error, info, warn};

use crate::auth::Session;
use crate::crypto::{self, Password, SecretKey, SALT_LEN};
use crate::errors::{CredVaultError, Result};
use crate::storage::{validate_name, Storage};

use super::format::VaultContainer;
use super::record::{Credential, CredentialField, VaultRecord};

/// Failed unlocks allowed before the service refuses further attempts.
pub const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// Vault created for every new account.
pub const DEFAULT_VAULT_NAME: &str = "safe-vault";

/// Everything held while a vault is open.  Key and record wipe on drop.
struct OpenVault {
    user: String,
    name: String,
    iterations: u32,
    salt: [u8; SALT_LEN],
    key: SecretKey,
    record: VaultRecord,
}

enum VaultState {
    Locked { failed_attempts: u32 },
    Unlocked(Box<OpenVault>),
    LockedOut,
    Compromised,
}

pub struct VaultService<'s, S: Storage + ?Sized> {
    storage: &'s S,
    iterations: u32,
    upgrade_iterations: bool,
    state: VaultState,
}

impl<'s, S: Storage + ?Sized> VaultService<'s, S> {
    /// `iterations` is used for new vaults and as the upgrade target.
    pub fn new(storage: &'s S, iterations: u32) -> Self {
        Self {
            storage,
            iterations,
            upgrade_iterations: true,
            state: VaultState::Locked { failed_attempts: 0 },
        }
    }

    /// Whether unlocking a vault with a lower iteration count re-keys it.
    pub fn with_upgrade_iterations(mut self, enabled: bool) -> Self {
        self.upgrade_iterations = enabled;
        self
    }

    /// Write a new, empty vault for `user` sealed under `password`.
    pub fn create(
        storage: &S,
        user: &str,
        name: &str,
        password: &Password,
        iterations: u32,
    ) -> Result<()> {
        validate_name("vault name", name)?;
        if storage.list_vault_names(user)?.iter().any(|n| n == name) {
            return Err(CredVaultError::VaultAlreadyExists(name.to_string()));
        }

        let salt = crypto::generate_salt()?;
        let key = crypto::derive(password.as_bytes(), &salt, iterations)?;
        let record = VaultRecord::new(name)?;
        let container = VaultContainer::seal(&record, &key, &salt, iterations)?;
        storage.save_vault_container(user, name, &container)?;

        info!(user = %user, vault = %name, "vault created");
        Ok(())
    }

    /// Create another vault for the signed-in user.
    ///
    /// The password must be the account password, so every vault of a user
    /// opens with the same secret.
    pub fn create_vault(&self, session: &Session, name: &str, password: Password) -> Result<()> {
        let user = session.require_user()?;
        if !self.account_password_matches(user, &password)? {
            return Err(CredVaultError::AuthenticationFailure);
        }
        Self::create(self.storage, user, name, &password, self.iterations)
    }

    /// Names of the signed-in user's vaults, sorted.
    pub fn vault_names(&self, session: &Session) -> Result<Vec<String>> {
        self.storage.list_vault_names(session.require_user()?)
    }

    /// Decrypt `name` for the signed-in user.
    ///
    /// - wrong password: `AuthenticationFailure`, one attempt consumed;
    ///   once `MAX_UNLOCK_ATTEMPTS` are used, `AttemptsExhausted`.
    /// - altered container: `TamperDetected`; the service stays compromised.
    ///
    /// Any vault already open is wiped first.
    pub fn unlock(&mut self, session: &Session, name: &str, password: Password) -> Result<()> {
        let user = session.require_user()?.to_string();

        match self.state {
            VaultState::Compromised => return Err(CredVaultError::TamperDetected),
            VaultState::LockedOut => return Err(CredVaultError::AttemptsExhausted),
            VaultState::Unlocked(_) => self.lock(),
            VaultState::Locked { .. } => {}
        }

        let container = self.storage.load_vault_container(&user, name)?;
        let salt = container.salt_array()?;
        let key = crypto::derive(password.as_bytes(), &salt, container.iterations)?;

        let record = match container.open(&key) {
            Ok(record) => record,
            Err(CredVaultError::AuthenticationFailure) => {
                // The cipher cannot tell a wrong key from altered bytes.  The
                // account record can: if the password is right, the bytes changed.
                if self.account_password_matches(&user, &password)? {
                    return Err(self.compromised(&user, name));
                }
                return Err(self.failed_attempt(&user, name));
            }
            Err(CredVaultError::TamperDetected) => return Err(self.compromised(&user, name)),
            Err(e) => return Err(e),
        };

        let mut open = OpenVault {
            user,
            name: name.to_string(),
            iterations: container.iterations,
            salt,
            key,
            record,
        };

        let upgrade = self.upgrade_iterations && open.iterations < self.iterations;
        if upgrade {
            open.salt = crypto::generate_salt()?;
            open.key = crypto::derive(password.as_bytes(), &open.salt, self.iterations)?;
            debug!(
                vault = %name,
                from = open.iterations,
                to = self.iterations,
                "upgrading iteration count"
            );
            open.iterations = self.iterations;
        }

        info!(user = %open.user, vault = %name, credentials = open.record.len(), "vault unlocked");
        self.state = VaultState::Unlocked(Box::new(open));

        if upgrade {
            // The re-keyed vault is already in memory; a later save retries.
            if let Err(e) = self.save() {
                warn!(vault = %name, error = %e, "could not save upgraded vault");
            }
        }
        Ok(())
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, VaultState::Unlocked(_))
    }

    pub fn is_locked_out(&self) -> bool {
        matches!(self.state, VaultState::LockedOut)
    }

    pub fn is_compromised(&self) -> bool {
        matches!(self.state, VaultState::Compromised)
    }

    /// Name of the open vault, if any.
    pub fn vault_name(&self) -> Option<&str> {
        match &self.state {
            VaultState::Unlocked(open) => Some(&open.name),
            _ => None,
        }
    }

    /// Iteration count of the open vault, if any.
    pub fn vault_iterations(&self) -> Option<u32> {
        match &self.state {
            VaultState::Unlocked(open) => Some(open.iterations),
            _ => None,
        }
    }

    pub fn remaining_attempts(&self) -> u32 {
        match self.state {
            VaultState::Locked { failed_attempts } => {
                MAX_UNLOCK_ATTEMPTS.saturating_sub(failed_attempts)
            }
            VaultState::Unlocked(_) => MAX_UNLOCK_ATTEMPTS,
            VaultState::LockedOut | VaultState::Compromised => 0,
        }
    }

    pub fn credentials(&self) -> Result<&[Credential]> {
        Ok(self.open()?.record.credentials())
    }

    /// First credential whose service name matches, ignoring case.
    pub fn get(&self, service_name: &str) -> Result<&Credential> {
        self.open()?
            .record
            .find(service_name)
            .ok_or_else(|| CredVaultError::CredentialNotFound(service_name.to_string()))
    }

    /// Append a credential.  In memory until `save`.
    pub fn add(&mut self, credential: Credential) -> Result<()> {
        self.open_mut()?.record.add(credential);
        Ok(())
    }

    /// Remove the first case-insensitive match.  In memory until `save`.
    pub fn remove(&mut self, service_name: &str) -> Result<Credential> {
        self.open_mut()?
            .record
            .remove(service_name)
            .ok_or_else(|| CredVaultError::CredentialNotFound(service_name.to_string()))
    }

    /// Change one field of the first match.  In memory until `save`.
    pub fn update(&mut self, service_name: &str, field: CredentialField, value: &str) -> Result<()> {
        self.open_mut()?.record.update(service_name, field, value)
    }

    /// Re-encrypt the whole vault under a fresh nonce and overwrite it.
    pub fn save(&self) -> Result<()> {
        let open = self.open()?;
        let container = VaultContainer::seal(&open.record, &open.key, &open.salt, open.iterations)?;
        self.storage
            .save_vault_container(&open.user, &open.name, &container)?;
        info!(user = %open.user, vault = %open.name, "vault saved");
        Ok(())
    }

    /// Wipe the open vault and sign the session out.
    pub fn close(&mut self, session: &mut Session) {
        self.lock();
        session.clear();
    }

    /// Wipe the open vault, if any.  Terminal states are kept.
    fn lock(&mut self) {
        if let VaultState::Unlocked(open) = &mut self.state {
            open.record.clear();
            info!(user = %open.user, vault = %open.name, "vault closed");
            self.state = VaultState::Locked { failed_attempts: 0 };
        }
    }

    fn open(&self) -> Result<&OpenVault> {
        match &self.state {
            VaultState::Unlocked(open) => Ok(&**open),
            _ => Err(CredVaultError::VaultLocked),
        }
    }

    fn open_mut(&mut self) -> Result<&mut OpenVault> {
        match &mut self.state {
            VaultState::Unlocked(open) => Ok(&mut **open),
            _ => Err(CredVaultError::VaultLocked),
        }
    }

    fn account_password_matches(&self, user: &str, password: &Password) -> Result<bool> {
        match self.storage.load_auth_records()?.find(user) {
            Some(record) => record.verify(password),
            None => Ok(false),
        }
    }

    fn failed_attempt(&mut self, user: &str, name: &str) -> CredVaultError {
        let failed = match self.state {
            VaultState::Locked { failed_attempts } => failed_attempts + 1,
            _ => 1,
        };
        warn!(user = %user, vault = %name, attempt = failed, "unlock failed");

        self.state = if failed >= MAX_UNLOCK_ATTEMPTS {
            warn!(user = %user, vault = %name, "unlock attempts exhausted");
            VaultState::LockedOut
        } else {
            VaultState::Locked {
                failed_attempts: failed,
            }
        };
        CredVaultError::AuthenticationFailure
    }

    fn compromised(&mut self, user: &str, name: &str) -> CredVaultError {
        error!(user = %user, vault = %name, "vault integrity check failed");
        self.state = VaultState::Compromised;
        CredVaultError::TamperDetected
    }
}
