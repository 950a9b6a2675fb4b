//! Interactive session: sign in, pick a vault, unlock it, then a REPL.
//!
//! Every edit is saved as soon as it is made.  `exit`, Ctrl-C, Ctrl-D and
//! a termination signal all close the vault and sign the session out.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use comfy_table::{ContentArrangement, Table};
use console::{style, Term};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use zeroize::Zeroizing;

use crate::auth::Session;
use crate::cli::commands::update::prompt_value;
use crate::cli::output;
use crate::cli::{prompt_password, retry_with_password, sign_in, unlock_attempt, Cli, Context};
use crate::errors::{CredVaultError, Result};
use crate::shutdown;
use crate::storage::FileStorage;
use crate::vault::{Credential, CredentialField, VaultService};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Prompt for service, username and password, then store them.
    Add,
    List,
    Get(String),
    Update {
        service: String,
        field: CredentialField,
        value: Option<String>,
    },
    Delete(String),
    Help,
    Clear,
    Exit,
}

impl ShellCommand {
    /// `(usage, description)` for the help table.
    const HELP: [(&'static str, &'static str); 8] = [
        ("add", "Add a credential (prompts for each field)"),
        ("list", "List stored services and usernames"),
        ("get <service>", "Show a credential, including its password"),
        (
            "update <service> <field> [value]",
            "Change service-name, username or password",
        ),
        ("delete <service>", "Delete a credential"),
        ("help", "Show this help"),
        ("clear", "Clear the screen"),
        ("exit", "Close the vault and sign out"),
    ];
}

impl FromStr for ShellCommand {
    type Err = CredVaultError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CredVaultError::CommandFailed("empty command".into()));
        };
        let rest: Vec<&str> = words.collect();

        let needs_service = |usage: &str| {
            CredVaultError::CommandFailed(format!("missing service name, usage: {usage}"))
        };

        match verb.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "list" | "ls" => Ok(Self::List),
            "get" => match rest.as_slice() {
                [] => Err(needs_service("get <service>")),
                words => Ok(Self::Get(words.join(" "))),
            },
            "delete" | "rm" => match rest.as_slice() {
                [] => Err(needs_service("delete <service>")),
                words => Ok(Self::Delete(words.join(" "))),
            },
            "update" => match rest.as_slice() {
                [service, field, value @ ..] => Ok(Self::Update {
                    service: service.to_string(),
                    field: field.parse()?,
                    value: (!value.is_empty()).then(|| value.join(" ")),
                }),
                _ => Err(CredVaultError::CommandFailed(
                    "usage: update <service> <field> [value]".into(),
                )),
            },
            "help" | "?" => Ok(Self::Help),
            "clear" | "cls" => Ok(Self::Clear),
            "exit" | "quit" | "logout" => Ok(Self::Exit),
            other => Err(CredVaultError::CommandFailed(format!(
                "unknown command '{other}', type `help` for a list"
            ))),
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::List => f.write_str("list"),
            Self::Get(_) => f.write_str("get"),
            Self::Update { .. } => f.write_str("update"),
            Self::Delete(_) => f.write_str("delete"),
            Self::Help => f.write_str("help"),
            Self::Clear => f.write_str("clear"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Run the whole interactive session.
pub fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = Session::new();
    sign_in(&ctx, cli, &mut session)?;

    let mut vault = ctx.vault_service();
    let result = open_and_repl(&ctx, cli, &session, &mut vault);

    vault.close(&mut session);
    output::info("Vault closed. Signed out.");
    result
}

fn open_and_repl(
    ctx: &Context,
    cli: &Cli,
    session: &Session,
    vault: &mut VaultService<'_, FileStorage>,
) -> Result<()> {
    let name = choose_vault(ctx, cli, vault, session)?;

    retry_with_password(&format!("Password for vault '{name}'"), |pw| {
        unlock_attempt(vault, session, &name, pw)
    })?;

    repl(vault, &name)
}

/// `--vault` if given; otherwise ask when the user has more than one.
fn choose_vault(
    ctx: &Context,
    cli: &Cli,
    vault: &VaultService<'_, FileStorage>,
    session: &Session,
) -> Result<String> {
    let default = ctx.vault_name(cli).to_string();
    if cli.vault.is_some() || !std::io::stdin().is_terminal() {
        return Ok(default);
    }

    let names = vault.vault_names(session)?;
    if names.len() <= 1 {
        return Ok(names.into_iter().next().unwrap_or(default));
    }

    let selected = dialoguer::Select::new()
        .with_prompt("Choose a vault")
        .items(&names)
        .default(names.iter().position(|n| *n == default).unwrap_or(0))
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("vault prompt: {e}")))?;
    shutdown::process().check()?;

    Ok(names[selected].clone())
}

fn repl(vault: &mut VaultService<'_, FileStorage>, name: &str) -> Result<()> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| CredVaultError::CommandFailed(format!("failed to initialize readline: {e}")))?;

    output::success(&format!(
        "Vault '{name}' unlocked ({} credential(s)). Type {} for commands.",
        vault.credentials()?.len(),
        style("help").yellow()
    ));

    let prompt = format!("{}> ", style(name).green());
    let shutdown = shutdown::process();
    loop {
        if shutdown.is_requested() {
            break;
        }

        match rl.readline(&prompt) {
            Ok(_) if shutdown.is_requested() => break,
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match trimmed.parse::<ShellCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        output::error(&e.to_string());
                        continue;
                    }
                };

                // Keep typed values out of the history buffer.
                if !matches!(command, ShellCommand::Update { .. }) {
                    let _ = rl.add_history_entry(trimmed);
                }

                debug!(command = %command, "shell command");
                if command == ShellCommand::Exit {
                    break;
                }

                match execute(vault, command) {
                    Ok(()) => {}
                    Err(CredVaultError::Interrupted) => break,
                    Err(e) => {
                        output::error(&e.to_string());
                        if e.is_security_error() {
                            return Err(e);
                        }
                    }
                }
            }
            // Ctrl-C / Ctrl-D
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                output::error(&e.to_string());
                break;
            }
        }
    }

    Ok(())
}

fn execute(vault: &mut VaultService<'_, FileStorage>, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Add => {
            let service = prompt_value(CredentialField::ServiceName)?;
            let username = prompt_value(CredentialField::Username)?;
            let password = prompt_password("Password")?;
            vault.add(Credential::new(service, username, password.as_str()))?;
            vault.save()?;
            output::success("Credential added");
        }
        ShellCommand::List => output::print_credentials_table(vault.credentials()?),
        ShellCommand::Get(service) => output::print_credential(vault.get(&service)?),
        ShellCommand::Update {
            service,
            field,
            value,
        } => {
            let value = Zeroizing::new(match value {
                Some(v) => v,
                None => prompt_value(field)?,
            });
            vault.update(&service, field, &value)?;
            vault.save()?;
            output::success(&format!("Updated {field} of '{service}'"));
        }
        ShellCommand::Delete(service) => {
            let removed = vault.remove(&service)?;
            vault.save()?;
            output::success(&format!("Deleted credential '{}'", removed.service_name));
        }
        ShellCommand::Help => print_help(),
        ShellCommand::Clear => Term::stdout().clear_screen()?,
        ShellCommand::Exit => {}
    }
    Ok(())
}

fn print_help() {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Command", "Description"]);
    for (usage, description) in ShellCommand::HELP {
        table.add_row(vec![usage, description]);
    }
    println!("{table}");
}
