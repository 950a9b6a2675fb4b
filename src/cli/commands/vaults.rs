//! `credvault vaults` — list the signed-in account's vaults.

use crate::auth::Session;
use crate::cli::output;
use crate::cli::{sign_in, Cli, Context};
use crate::errors::Result;

/// Execute the `vaults` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = Session::new();
    sign_in(&ctx, cli, &mut session)?;

    let names = ctx.vault_service().vault_names(&session)?;
    output::info(&format!("{} vault(s)", names.len()));
    output::print_vault_names(&names, &ctx.settings.default_vault);

    session.clear();
    Ok(())
}
