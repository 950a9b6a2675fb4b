//! Who is signed in.
//!
//! One `Session` lives for the duration of a CLI invocation or shell.
//! It is passed explicitly to the services instead of being global state.

use crate::errors::{CredVaultError, Result};

#[derive(Debug, Default)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in username, if any.
    pub fn username(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The signed-in username, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&str> {
        self.username().ok_or(CredVaultError::NotAuthenticated)
    }

    pub(crate) fn authenticate(&mut self, username: &str) {
        self.user = Some(username.to_string());
    }

    /// Forget the signed-in user.
    pub fn clear(&mut self) {
        self.user = None;
    }
}
