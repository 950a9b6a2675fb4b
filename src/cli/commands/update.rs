//! `credvault update` — change one field of a credential.

use zeroize::{Zeroize, Zeroizing};

use crate::cli::output;
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::{CredVaultError, Result};
use crate::shutdown;
use crate::vault::CredentialField;

/// Execute the `update` command.
pub fn execute(cli: &Cli, service: &str, field: &str, value: Option<&str>) -> Result<()> {
    let field: CredentialField = field.parse()?;

    let value = match value {
        Some(v) => {
            if field == CredentialField::Password {
                output::warning("Password provided on command line — it may appear in shell history.");
            }
            Zeroizing::new(v.to_string())
        }
        None => Zeroizing::new(prompt_value(field)?),
    };

    with_unlocked_vault(cli, |vault| {
        vault.update(service, field, &value)?;
        vault.save()
    })?;

    output::success(&format!("Updated {field} of '{service}'"));

    Ok(())
}

/// Ask for the new value; passwords are read hidden.
pub(crate) fn prompt_value(field: CredentialField) -> Result<String> {
    let prompt = format!("New {field}");
    let result = match field {
        CredentialField::Password => dialoguer::Password::new().with_prompt(prompt).interact(),
        _ => dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text(),
    };
    let mut value =
        result.map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?;
    if let Err(e) = shutdown::process().check() {
        value.zeroize();
        return Err(e);
    }
    Ok(value)
}
