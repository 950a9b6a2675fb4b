//! `credvault shell` — sign in and open the interactive session.

use crate::cli::{shell, Cli};
use crate::errors::Result;

/// Execute the `shell` command.
pub fn execute(cli: &Cli) -> Result<()> {
    shell::run(cli)
}
