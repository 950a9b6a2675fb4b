use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_ITERATIONS;
use crate::errors::{CredVaultError, Result};
use crate::vault::DEFAULT_VAULT_NAME;

/// Lowest iteration count accepted from a config file.
pub const MIN_KDF_ITERATIONS: u32 = 10_000;

/// User-level configuration, loaded from `<data_dir>/config.toml`.
///
/// Every field has a default so credvault works without a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// PBKDF2 iterations for new accounts and vaults.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Re-key vaults with fewer iterations than `kdf_iterations` on unlock.
    #[serde(default = "default_upgrade_iterations")]
    pub upgrade_iterations: bool,

    /// Vault opened when `--vault` is not given.
    #[serde(default = "default_vault")]
    pub default_vault: String,

    /// Log filter level when neither `--log-level` nor `CREDVAULT_LOG` is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_upgrade_iterations() -> bool {
    true
}

fn default_vault() -> String {
    DEFAULT_VAULT_NAME.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            upgrade_iterations: default_upgrade_iterations(),
            default_vault: default_vault(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the data directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<data_dir>/config.toml`.
    ///
    /// A missing file gives the defaults.  A file that does not parse, or
    /// asks for too few iterations, is a `ConfigError`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = Self::path(data_dir);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// `<data_dir>/config.toml`
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE_NAME)
    }

    fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(CredVaultError::ConfigError(format!(
                "kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                self.kdf_iterations
            )));
        }
        crate::storage::validate_name("default_vault", &self.default_vault)
            .map_err(|e| CredVaultError::ConfigError(e.to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
