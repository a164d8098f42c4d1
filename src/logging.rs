//! Diagnostic tracing for the `todo` binary.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`; command output
//! on stdout is never affected. Data the program could not keep (dropped
//! lines, failed saves) is recorded separately in the recovery log
//! (`io::recovery`), which is always written.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. Defaults to `warn` when `RUST_LOG` is unset.
///
/// ```bash
/// RUST_LOG=todo_list=debug todo list
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
