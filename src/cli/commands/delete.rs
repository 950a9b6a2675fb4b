//! `credvault delete` — remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, service: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete credential for '{service}'?"))
            .default(false)
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = with_unlocked_vault(cli, |vault| {
        let removed = vault.remove(service)?;
        vault.save()?;
        Ok(removed.service_name.clone())
    })?;

    output::success(&format!("Deleted credential '{removed}'"));

    Ok(())
}
