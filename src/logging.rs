//! Diagnostic logging.
//!
//! Logs go to standard error, colored only when that is a terminal.
//! Standard output is reserved for the generator's own output, which we
//! echo verbatim.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Install a global subscriber at `level`.  `RUST_LOG` still wins if set.
/// Calling this more than once is harmless.
pub fn init_logging(level: &str) {
    let default = format!("{},hscope={}", level, level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_level(true)
        .try_init()
        .ok();
}

#[test]
fn init_twice() {
    init_logging("debug");
    init_logging("warn");
    tracing::debug!("still alive");
}
