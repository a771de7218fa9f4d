//! Shared plumbing for the command-line tools.
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only data.
//! The log filter comes from `RUST_LOG` and defaults to `warn`.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::error::TabError;

/// Install the stderr log subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Exit status for a failed run: 2 for invalid arguments, 1 otherwise.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TabError>()
        .map_or(1, TabError::exit_code)
}

/// Print `err` with its context chain and turn it into an exit status.
#[must_use]
pub fn report(tool: &str, err: &anyhow::Error) -> ExitCode {
    eprintln!("{tool}: {err:#}");
    ExitCode::from(exit_code(err))
}
