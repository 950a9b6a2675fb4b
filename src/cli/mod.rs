//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;
pub mod shell;

use std::path::PathBuf;

use clap::Parser;

use crate::auth::{AuthService, Session};
use crate::config::Settings;
use crate::crypto::Password;
use crate::errors::{CredVaultError, Result};
use crate::shutdown::{self, ShutdownFlag};
use crate::storage::{FileStorage, Storage};
use crate::vault::VaultService;

/// Environment variable checked for the account password before prompting.
pub const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// Data directory name under the home directory.
const DEFAULT_DATA_DIR: &str = ".credvault";

/// credvault CLI: local encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Local encrypted credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: ~/.credvault)
    #[arg(long, env = "CREDVAULT_HOME", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Account to sign in as (prompted if omitted)
    #[arg(short, long, env = "CREDVAULT_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Vault to open (default: `default_vault` from config, i.e. safe-vault)
    #[arg(short, long, global = true)]
    pub vault: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an account and its default vault
    Signup {
        /// Username (letters, digits, '_' and '-')
        username: String,
    },

    /// Sign in and open an interactive session
    Shell,

    /// Add a credential
    Add {
        /// Service name (e.g. github)
        service: String,
        /// Username for the service
        username: String,
        /// Password for the service (omit for piped input or a prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show a credential, including its password
    Get {
        /// Service name (case-insensitive)
        service: String,
    },

    /// List all credentials
    List,

    /// Delete a credential
    Delete {
        /// Service name (case-insensitive)
        service: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change one field of a credential
    Update {
        /// Service name (case-insensitive)
        service: String,
        /// Field to change: service-name, username or password
        field: String,
        /// New value (omit for a prompt)
        value: Option<String>,
    },

    /// List your vaults
    Vaults,

    /// Create another vault for your account
    NewVault {
        /// Vault name (letters, digits, '_' and '-')
        name: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Storage and settings for one invocation.
pub struct Context {
    pub storage: FileStorage,
    pub settings: Settings,
}

impl Context {
    /// Resolve the data directory and load its settings.
    pub fn load(cli: &Cli) -> Result<Self> {
        let dir = data_dir(cli)?;
        let settings = Settings::load(&dir)?;
        Ok(Self {
            storage: FileStorage::new(dir),
            settings,
        })
    }

    pub fn auth_service(&self) -> AuthService<'_, FileStorage> {
        AuthService::new(&self.storage, self.settings.kdf_iterations)
    }

    pub fn vault_service(&self) -> VaultService<'_, FileStorage> {
        VaultService::new(&self.storage, self.settings.kdf_iterations)
            .with_upgrade_iterations(self.settings.upgrade_iterations)
    }

    /// `--vault`, or the configured default.
    pub fn vault_name<'a>(&'a self, cli: &'a Cli) -> &'a str {
        cli.vault.as_deref().unwrap_or(&self.settings.default_vault)
    }
}

/// `--data-dir` / `CREDVAULT_HOME`, or `~/.credvault`.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DATA_DIR))
        .ok_or_else(|| {
            CredVaultError::ConfigError(
                "cannot determine home directory; pass --data-dir or set CREDVAULT_HOME".into(),
            )
        })
}

/// Log level for this run: `--log-level`, then the config file, then "warn".
pub fn log_level(cli: &Cli) -> String {
    if let Some(level) = &cli.log_level {
        return level.clone();
    }
    data_dir(cli)
        .and_then(|dir| Settings::load(&dir))
        .map(|s| s.log_level)
        .unwrap_or_else(|_| Settings::default().log_level)
}

/// The account password from `CREDVAULT_PASSWORD`, if set and non-empty.
pub fn password_from_env() -> Option<Password> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Password::new)
}

/// Hidden interactive password prompt.
pub fn prompt_password(prompt: &str) -> Result<Password> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map(Password::new)
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    shutdown::process().check()?;
    Ok(pw)
}

/// Prompt for a new account password with confirmation (used by `signup`).
///
/// Also respects `CREDVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Password> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    loop {
        let pw = dialoguer::Password::new()
            .with_prompt("Choose account password")
            .with_confirmation("Confirm account password", "Passwords do not match, try again")
            .allow_empty_password(true)
            .interact()
            .map(Password::new)
            .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
        shutdown::process().check()?;

        if pw.is_empty() {
            output::warning("Password cannot be empty. Try again.");
            continue;
        }
        return Ok(pw);
    }
}

/// `--account` / `CREDVAULT_ACCOUNT`, or an interactive prompt.
pub fn account(cli: &Cli) -> Result<String> {
    if let Some(name) = &cli.account {
        return Ok(name.clone());
    }
    let name = dialoguer::Input::<String>::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(|e| CredVaultError::CommandFailed(format!("username prompt: {e}")))?;
    shutdown::process().check()?;
    Ok(name)
}

/// Run `attempt` with passwords until it succeeds or fails for good.
///
/// With `CREDVAULT_PASSWORD` set there is exactly one attempt.  Otherwise
/// the user is prompted again after each retryable error.  Returns the
/// password that worked.
pub fn retry_with_password<F>(prompt: &str, mut attempt: F) -> Result<Password>
where
    F: FnMut(Password) -> Result<()>,
{
    if let Some(pw) = password_from_env() {
        attempt(pw.clone())?;
        return Ok(pw);
    }

    retry(shutdown::process(), || prompt_password(prompt), attempt)
}

/// Feed passwords from `next_password` to `attempt` until one is accepted.
///
/// Retryable errors print a warning and ask again; anything else ends the
/// loop, including `AttemptsExhausted` from [`login_attempt`] and
/// [`unlock_attempt`].
pub(crate) fn retry<N, F>(
    shutdown: &ShutdownFlag,
    mut next_password: N,
    mut attempt: F,
) -> Result<Password>
where
    N: FnMut() -> Result<Password>,
    F: FnMut(Password) -> Result<()>,
{
    loop {
        shutdown.check()?;
        let pw = next_password()?;
        shutdown.check()?;

        match attempt(pw.clone()) {
            Ok(()) => return Ok(pw),
            Err(e) if e.is_retryable() => output::warning(&e.to_string()),
            Err(e) => return Err(e),
        }
    }
}

/// A failure that used up the last attempt ends the loop right away.
fn out_of_attempts(err: CredVaultError, remaining: u32) -> CredVaultError {
    if err.is_retryable() && remaining == 0 {
        output::warning(&err.to_string());
        CredVaultError::AttemptsExhausted
    } else {
        err
    }
}

/// One login try; the last allowed failure comes back as `AttemptsExhausted`.
pub(crate) fn login_attempt<S: Storage + ?Sized>(
    auth: &mut AuthService<'_, S>,
    session: &mut Session,
    username: &str,
    password: Password,
) -> Result<()> {
    auth.login(session, username, password)
        .map_err(|e| out_of_attempts(e, auth.remaining_attempts()))
}

/// One unlock try; the last allowed failure comes back as `AttemptsExhausted`.
pub(crate) fn unlock_attempt<S: Storage + ?Sized>(
    vault: &mut VaultService<'_, S>,
    session: &Session,
    name: &str,
    password: Password,
) -> Result<()> {
    vault
        .unlock(session, name, password)
        .map_err(|e| out_of_attempts(e, vault.remaining_attempts()))
}

/// Sign `session` in as the selected account.  Returns the password used.
pub fn sign_in(ctx: &Context, cli: &Cli, session: &mut Session) -> Result<Password> {
    let username = account(cli)?;
    let mut auth = ctx.auth_service();
    retry_with_password("Password", |pw| {
        login_attempt(&mut auth, session, &username, pw)
    })
}

/// Sign in, unlock the selected vault, run `f`, then close everything.
///
/// The vault is unlocked with the sign-in password, so one-shot commands
/// ask for it only once.
pub fn with_unlocked_vault<T>(
    cli: &Cli,
    f: impl FnOnce(&mut VaultService<'_, FileStorage>) -> Result<T>,
) -> Result<T> {
    let ctx = Context::load(cli)?;
    let mut session = Session::new();
    let password = sign_in(&ctx, cli, &mut session)?;

    let mut vault = ctx.vault_service();
    let result = vault
        .unlock(&session, ctx.vault_name(cli), password)
        .and_then(|()| f(&mut vault));

    vault.close(&mut session);
    result
}
