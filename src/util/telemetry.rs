//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Users can install their own subscriber; this helper
/// installs a `RUST_LOG`-driven fmt subscriber if none is set.
pub fn init_tracing() {
    init_tracing_with_default("warn");
}

/// Like [`init_tracing`], falling back to `directive` when `RUST_LOG` is unset.
///
/// `init_tracing_with_default("prometheus_safe_io=trace")` shows every gate
/// acquisition and release.
pub fn init_tracing_with_default(directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
