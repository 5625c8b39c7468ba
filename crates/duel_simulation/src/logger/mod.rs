//! Logging setup for the simulation.
//!
//! All modules log through `tracing` macros. The headless binary and tests
//! call [`init_logger`] once; an embedding host (game client, editor) is free
//! to install its own subscriber instead, in which case this is a no-op.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a fmt subscriber honouring `RUST_LOG`.
///
/// Safe to call repeatedly: only the first call installs a subscriber.
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// Same as [`init_logger`] with an explicit fallback filter
/// (e.g. `"duel_simulation=debug"`).
pub fn init_logger_with(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Another subscriber already installed (host app, earlier test): keep it
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}
