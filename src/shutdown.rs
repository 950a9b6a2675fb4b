//! Signal-driven shutdown.
//!
//! SIGINT, SIGTERM and SIGHUP raise a flag instead of killing the process.
//! Prompt loops and the shell check the flag and unwind, so an open vault
//! is closed and its key wiped on the way out.  A main thread stuck in a
//! blocking terminal read cannot see the flag; the process exits after
//! `GRACE` in that case.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::{CredVaultError, Result};

/// Exit status after a signal (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

const GRACE: Duration = Duration::from_secs(3);

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once shutdown has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_requested() {
            Err(CredVaultError::Interrupted)
        } else {
            Ok(())
        }
    }
}

static PROCESS: OnceLock<ShutdownFlag> = OnceLock::new();

/// The flag the signal handler raises.
pub fn process() -> &'static ShutdownFlag {
    PROCESS.get_or_init(ShutdownFlag::new)
}

/// Route termination signals to [`process`].
pub fn install() -> Result<()> {
    let flag = process().clone();
    ctrlc::set_handler(move || {
        info!("signal received, shutting down");
        flag.request();

        std::thread::sleep(GRACE);
        warn!("still blocked after {GRACE:?}, exiting");
        std::process::exit(EXIT_INTERRUPTED);
    })
    .map_err(|e| CredVaultError::CommandFailed(format!("failed to install signal handler: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_clear() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_requested());
        assert!(flag.check().is_ok());
    }

    #[test]
    fn request_is_seen_by_clones() {
        let flag = ShutdownFlag::new();
        let handler_side = flag.clone();
        handler_side.request();

        assert!(flag.is_requested());
        assert!(matches!(flag.check(), Err(CredVaultError::Interrupted)));
    }
}
