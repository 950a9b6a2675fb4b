//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Credential;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of credentials (service and username, never the password).
pub fn print_credentials_table(credentials: &[Credential]) {
    if credentials.is_empty() {
        info("No credentials in this vault yet.");
        tip("Run `credvault add <SERVICE> <USERNAME>` to add your first one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Service", "Username"]);

    for (i, c) in credentials.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            c.service_name.clone(),
            c.username.clone(),
        ]);
    }

    println!("{table}");
}

/// Print one credential including its password.
pub fn print_credential(credential: &Credential) {
    println!("{} {}", style("Service: ").bold(), credential.service_name);
    println!("{} {}", style("Username:").bold(), credential.username);
    println!("{} {}", style("Password:").bold(), credential.password);
}

/// Print a list of vault names, marking the default one.
pub fn print_vault_names(names: &[String], default: &str) {
    if names.is_empty() {
        info("No vaults found.");
        return;
    }

    for name in names {
        if name == default {
            println!("  {} {}", style(name).green().bold(), style("(default)").dim());
        } else {
            println!("  {name}");
        }
    }
}
