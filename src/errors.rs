use thiserror::Error;

/// All errors that can occur in credvault.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Authentication errors ---
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Too many failed attempts — giving up")]
    AttemptsExhausted,

    #[error("Not signed in")]
    NotAuthenticated,

    // --- Vault errors ---
    #[error("Invalid password")]
    AuthenticationFailure,

    #[error("Vault tampered with — integrity check failed, refusing to open it")]
    TamperDetected,

    #[error("No vault is unlocked")]
    VaultLocked,

    #[error("Vault '{0}' already exists")]
    VaultAlreadyExists(String),

    #[error("Vault '{0}' not found")]
    VaultNotFound(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("No credential found for service '{0}'")]
    CredentialNotFound(String),

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    DerivationError(String),

    #[error("Cipher unavailable: {0}")]
    CipherUnavailable(String),

    // --- Storage errors ---
    #[error("Invalid {field} '{value}' — only letters, digits, '_' and '-' are allowed (max 64)")]
    InvalidName { field: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Interrupted")]
    Interrupted,
}

impl CredVaultError {
    /// Errors the user may fix by trying again with different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::AuthenticationFailure)
    }

    /// Errors that mean the stored data can no longer be trusted.
    pub fn is_security_error(&self) -> bool {
        matches!(self, Self::TamperDetected)
    }
}

/// Convenience type alias for credvault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
