//! `credvault add` — store a new credential.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::{CredVaultError, Result};
use crate::shutdown;
use crate::vault::Credential;

/// Execute the `add` command.
pub fn execute(cli: &Cli, service: &str, username: &str, password: Option<&str>) -> Result<()> {
    // Determine the credential password from one of three sources.
    let secret = if let Some(p) = password {
        // Source 1: Inline value on the command line.
        output::warning("Password provided on command line — it may appear in shell history.");
        Zeroizing::new(p.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        buf
    } else {
        // Source 3: Interactive secure prompt (default).
        Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Password for {service}"))
                .interact()
                .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?,
        )
    };
    shutdown::process().check()?;

    let (vault_name, total) = with_unlocked_vault(cli, |vault| {
        vault.add(Credential::new(service, username, secret.as_str()))?;
        vault.save()?;
        Ok((
            vault.vault_name().unwrap_or_default().to_string(),
            vault.credentials()?.len(),
        ))
    })?;

    output::success(&format!(
        "Credential for '{service}' added to {vault_name} ({total} total)"
    ));

    Ok(())
}
