//! Vaults: the plaintext record, its sealed container, and the service
//! that opens and saves them.

pub mod format;
pub mod record;
pub mod service;

pub use format::VaultContainer;
pub use record::{Credential, CredentialField, VaultRecord};
pub use service::{VaultService, DEFAULT_VAULT_NAME, MAX_UNLOCK_ATTEMPTS};
