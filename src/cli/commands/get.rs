//! `credvault get` — print one credential.

use crate::cli::output;
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, service: &str) -> Result<()> {
    with_unlocked_vault(cli, |vault| {
        output::print_credential(vault.get(service)?);
        Ok(())
    })
}
