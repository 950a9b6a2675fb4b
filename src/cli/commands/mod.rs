pub mod add;
pub mod completions;
pub mod delete;
pub mod get;
pub mod list;
pub mod new_vault;
pub mod shell;
pub mod signup;
pub mod update;
pub mod vaults;
