//! `credvault new-vault` — create another vault for the signed-in account.

use crate::auth::Session;
use crate::cli::output;
use crate::cli::{sign_in, Cli, Context};
use crate::errors::Result;

/// Execute the `new-vault` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = Session::new();
    let password = sign_in(&ctx, cli, &mut session)?;

    let result = ctx.vault_service().create_vault(&session, name, password);
    session.clear();
    result?;

    output::success(&format!("Vault '{name}' created"));
    output::tip(&format!("Use it with: credvault -v {name} list"));

    Ok(())
}
