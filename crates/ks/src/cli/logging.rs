//! Diagnostic logging for the `ks` binary.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `KS_LOG=ks_engine=debug`.
pub const LOG_ENV: &str = "KS_LOG";

/// Installs a stderr subscriber filtered by `$KS_LOG` (warnings by default).
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .without_time()
        .init();
}
