//! Tracing/logging initialization.
//!
//! The ledger crates emit structured events at mutation and persistence
//! boundaries; hosts call this once to get JSON logs out of them.

use tracing_subscriber::EnvFilter;

/// Default directive: ledger-side crates at debug, everything else at info.
const DEFAULT_DIRECTIVES: &str =
    "info,stockbook_ledger=debug,stockbook_service=debug,stockbook_store=debug";

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` overrides the default directives entirely. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default(DEFAULT_DIRECTIVES)
}

/// [`init`] with a caller-supplied fallback directive string for hosts that
/// want a different baseline than the ledger-at-debug default.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
