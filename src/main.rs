use clap::Parser;
use credvault::cli::commands;
use credvault::cli::{log_level, output, Cli, Commands};
use credvault::errors::CredVaultError;
use credvault::shutdown;

fn main() {
    let cli = Cli::parse();

    credvault::logging::init(&log_level(&cli));
    if let Err(e) = shutdown::install() {
        output::warning(&e.to_string());
    }

    let result = match cli.command {
        Commands::Signup { ref username } => commands::signup::execute(&cli, username),
        Commands::Shell => commands::shell::execute(&cli),
        Commands::Add {
            ref service,
            ref username,
            ref password,
        } => commands::add::execute(&cli, service, username, password.as_deref()),
        Commands::Get { ref service } => commands::get::execute(&cli, service),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete { ref service, force } => {
            commands::delete::execute(&cli, service, force)
        }
        Commands::Update {
            ref service,
            ref field,
            ref value,
        } => commands::update::execute(&cli, service, field, value.as_deref()),
        Commands::Vaults => commands::vaults::execute(&cli),
        Commands::NewVault { ref name } => commands::new_vault::execute(&cli, name),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    match result {
        Err(CredVaultError::Interrupted) => std::process::exit(shutdown::EXIT_INTERRUPTED),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
        Ok(()) if shutdown::process().is_requested() => {
            std::process::exit(shutdown::EXIT_INTERRUPTED)
        }
        Ok(()) => {}
    }
}
