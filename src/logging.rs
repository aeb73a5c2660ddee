//! Log output for the command-line binary.
//!
//! Logs go to stderr so stdout carries only the run summary. `RUST_LOG`
//! overrides the level picked from the `-v` count.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "class_rewriter=warn",
        1 => "class_rewriter=info",
        _ => "class_rewriter=debug",
    }
}

pub fn init(verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
