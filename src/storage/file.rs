//! JSON-file storage under a data directory.
//!
//! Layout:
//!
//! ```text
//! <root>/.auth/auth.json
//! <root>/<user>/<vault>.json
//! ```
//!
//! Every write goes to a temp file in the same directory and is renamed
//! over the target, so readers never see a half-written document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::auth::AuthRecords;
use crate::errors::{CredVaultError, Result};
use crate::vault::VaultContainer;

use super::{validate_name, Storage};

const AUTH_DIR: &str = ".auth";
const AUTH_FILENAME: &str = "auth.json";
const VAULT_EXTENSION: &str = "json";

/// Storage rooted at a directory (e.g. `~/.credvault`).
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn auth_path(&self) -> PathBuf {
        self.root.join(AUTH_DIR).join(AUTH_FILENAME)
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf> {
        validate_name("username", user)?;
        Ok(self.root.join(user))
    }

    /// Full path of a vault container file.
    ///
    /// Example: `<root>/alice/safe-vault.json`
    pub fn vault_path(&self, user: &str, vault_name: &str) -> Result<PathBuf> {
        validate_name("vault name", vault_name)?;
        Ok(self
            .user_dir(user)?
            .join(format!("{vault_name}.{VAULT_EXTENSION}")))
    }
}

impl Storage for FileStorage {
    fn load_auth_records(&self) -> Result<AuthRecords> {
        match fs::read_to_string(self.auth_path()) {
            Ok(json) => AuthRecords::from_json(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AuthRecords::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_auth_records(&self, records: &AuthRecords) -> Result<()> {
        write_atomic(&self.auth_path(), records.to_json()?.as_bytes())
    }

    fn load_vault_container(&self, user: &str, vault_name: &str) -> Result<VaultContainer> {
        let path = self.vault_path(user, vault_name)?;
        match fs::read_to_string(&path) {
            Ok(json) => VaultContainer::from_json(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CredVaultError::VaultNotFound(vault_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_vault_container(
        &self,
        user: &str,
        vault_name: &str,
        container: &VaultContainer,
    ) -> Result<()> {
        let path = self.vault_path(user, vault_name)?;
        write_atomic(&path, container.to_json()?.as_bytes())
    }

    fn list_vault_names(&self, user: &str) -> Result<Vec<String>> {
        let dir = self.user_dir(user)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VAULT_EXTENSION) {
                continue;
            }
            // Skip temp files and anything else that is not a valid vault name.
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name("vault name", stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Write `contents` to `path` via temp file + rename, owner-only on Unix.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
        }
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthRecord;
    use crate::crypto::{Password, SecretKey};
    use crate::vault::VaultRecord;
    use tempfile::TempDir;

    fn container() -> VaultContainer {
        let record = VaultRecord::new("safe-vault").unwrap();
        let key = SecretKey::generate().unwrap();
        VaultContainer::seal(&record, &key, &[1u8; 16], 1_000).unwrap()
    }

    #[test]
    fn missing_auth_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load_auth_records().unwrap().is_empty());
    }

    #[test]
    fn auth_records_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        let mut records = AuthRecords::new();
        records
            .push(AuthRecord::new("alice", &Password::from("pw"), 1_000).unwrap())
            .unwrap();
        storage.save_auth_records(&records).unwrap();

        assert!(dir.path().join(".auth/auth.json").exists());
        let loaded = storage.load_auth_records().unwrap();
        assert_eq!(loaded.find("alice"), records.find("alice"));
    }

    #[test]
    fn vault_container_roundtrip_and_listing() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        let c = container();

        storage.save_vault_container("alice", "work", &c).unwrap();
        storage.save_vault_container("alice", "safe-vault", &c).unwrap();

        assert_eq!(storage.load_vault_container("alice", "work").unwrap(), c);
        assert_eq!(
            storage.list_vault_names("alice").unwrap(),
            vec!["safe-vault".to_string(), "work".to_string()]
        );
        // No temp files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("alice"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_vault_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.load_vault_container("alice", "nope"),
            Err(CredVaultError::VaultNotFound(_))
        ));
        assert!(storage.list_vault_names("alice").unwrap().is_empty());
    }

    #[test]
    fn unsafe_names_never_touch_disk() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        let err = storage
            .save_vault_container("../evil", "v", &container())
            .unwrap_err();
        assert!(matches!(err, CredVaultError::InvalidName { .. }));
        assert!(matches!(
            storage.load_vault_container("alice", "../../x"),
            Err(CredVaultError::InvalidName { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage
            .save_vault_container("alice", "safe-vault", &container())
            .unwrap();

        let path = storage.vault_path("alice", "safe-vault").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
