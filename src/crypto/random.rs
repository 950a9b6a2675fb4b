//! Cryptographically secure random bytes from the operating system.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{CredVaultError, Result};

/// Fill `buf` from the OS CSPRNG.
pub fn fill(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CredVaultError::CipherUnavailable(format!("OS random source: {e}")))
}

/// Return `N` fresh random bytes.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill(&mut buf)?;
    Ok(buf)
}
