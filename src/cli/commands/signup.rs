//! `credvault signup` — create an account and its default vault.

use crate::auth::Session;
use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, Context};
use crate::errors::Result;
use crate::vault::DEFAULT_VAULT_NAME;

/// Execute the `signup` command.
pub fn execute(cli: &Cli, username: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let password = prompt_new_password()?;

    let mut session = Session::new();
    ctx.auth_service().signup(&mut session, username, password)?;

    output::success(&format!(
        "Account '{username}' created with vault '{DEFAULT_VAULT_NAME}' in {}",
        ctx.storage.root().display()
    ));
    output::tip(&format!(
        "Add a credential: credvault -a {username} add <SERVICE> <USERNAME>"
    ));

    Ok(())
}
