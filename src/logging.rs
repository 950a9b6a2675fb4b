//! Diagnostic logging to stderr.
//!
//! `CREDVAULT_LOG` takes a full `EnvFilter` directive and wins over the
//! level passed in.  Secrets never go through these macros.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "CREDVAULT_LOG";

/// Install the global subscriber.  Calling it twice is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn default_directive(level: &str) -> String {
    format!("credvault={level},warn")
}
