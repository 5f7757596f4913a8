//! Test log output
//!
//! Library crates never install a subscriber. Tests that want to see the
//! navigator's `tracing` output call [`init_test_tracing`]; `RUST_LOG`
//! controls the filter (default: debug for the waypoint crates).

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per process.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("waypoint_core=debug,waypoint_bridge=debug"));
    // A second call in the same process finds a subscriber already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
