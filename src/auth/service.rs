//! Signup and login against the authentication records.

use tracing::{info, warn};

use crate::crypto::{self, Password, SALT_LEN};
use crate::errors::{CredVaultError, Result};
use crate::storage::{validate_name, Storage};
use crate::vault::{VaultService, DEFAULT_VAULT_NAME};

use super::record::AuthRecord;
use super::session::Session;

/// Failed logins allowed before the service refuses further attempts.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Salt for the throwaway derivation run when the username is unknown.
const DUMMY_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

pub struct AuthService<'s, S: Storage + ?Sized> {
    storage: &'s S,
    iterations: u32,
    failed_attempts: u32,
}

impl<'s, S: Storage + ?Sized> AuthService<'s, S> {
    /// `iterations` is used for new accounts; existing ones keep their own.
    pub fn new(storage: &'s S, iterations: u32) -> Self {
        Self {
            storage,
            iterations,
            failed_attempts: 0,
        }
    }

    /// Register a new user and create their default vault.
    ///
    /// On success the session is signed in as `username`.  A taken
    /// username fails with `DuplicateUser`, and an existing default vault
    /// with `VaultAlreadyExists`; both leave the records untouched.
    pub fn signup(&mut self, session: &mut Session, username: &str, password: Password) -> Result<()> {
        validate_name("username", username)?;

        let mut records = self.storage.load_auth_records()?;
        if records.contains(username) {
            warn!(user = %username, "signup refused: username taken");
            return Err(CredVaultError::DuplicateUser(username.to_string()));
        }

        // A leftover vault under this name was sealed with some other
        // password; registering over it would make it look tampered with.
        if self
            .storage
            .list_vault_names(username)?
            .iter()
            .any(|n| n == DEFAULT_VAULT_NAME)
        {
            warn!(user = %username, "signup refused: stale default vault on disk");
            return Err(CredVaultError::VaultAlreadyExists(DEFAULT_VAULT_NAME.to_string()));
        }

        records.push(AuthRecord::new(username, &password, self.iterations)?)?;
        self.storage.save_auth_records(&records)?;

        VaultService::create(
            self.storage,
            username,
            DEFAULT_VAULT_NAME,
            &password,
            self.iterations,
        )?;

        session.authenticate(username);
        self.failed_attempts = 0;
        info!(user = %username, "signed up");
        Ok(())
    }

    /// Check `password` against the stored verifier for `username`.
    ///
    /// Unknown user and wrong password both return `InvalidCredentials`.
    /// After `MAX_LOGIN_ATTEMPTS` failures every call returns
    /// `AttemptsExhausted`.
    pub fn login(&mut self, session: &mut Session, username: &str, password: Password) -> Result<()> {
        if self.failed_attempts >= MAX_LOGIN_ATTEMPTS {
            return Err(CredVaultError::AttemptsExhausted);
        }

        let records = self.storage.load_auth_records()?;
        let verified = match records.find(username) {
            Some(record) => record.verify(&password)?,
            None => {
                // Same amount of work as a real check.
                crypto::derive(password.as_bytes(), &DUMMY_SALT, self.iterations)?;
                false
            }
        };

        if !verified {
            self.failed_attempts += 1;
            warn!(user = %username, attempt = self.failed_attempts, "login failed");
            return Err(CredVaultError::InvalidCredentials);
        }

        session.authenticate(username);
        self.failed_attempts = 0;
        info!(user = %username, "logged in");
        Ok(())
    }

    pub fn remaining_attempts(&self) -> u32 {
        MAX_LOGIN_ATTEMPTS.saturating_sub(self.failed_attempts)
    }
}
