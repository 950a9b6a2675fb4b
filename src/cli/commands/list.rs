//! `credvault list` — display all credentials in a table.

use crate::cli::output;
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    with_unlocked_vault(cli, |vault| {
        let credentials = vault.credentials()?;

        output::info(&format!(
            "{} — {} credential(s)",
            vault.vault_name().unwrap_or_default(),
            credentials.len()
        ));
        output::print_credentials_table(credentials);
        Ok(())
    })
}
