pub mod auth;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod shutdown;
pub mod storage;
pub mod vault;
