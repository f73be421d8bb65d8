use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AZPIPE_LOG";

/// Installs the stderr subscriber. `quiet` wins over `verbose` and `AZPIPE_LOG`.
pub fn init(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("warn,azpipe=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
