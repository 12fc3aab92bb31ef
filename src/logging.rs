//! Tracing subscriber setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events. Hosts that do not install
//! their own subscriber can call [`init_tracing`] once at startup.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "occlude=info";

/// Install a formatted subscriber honoring `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")
}

/// Like [`init_tracing`], for tests: writes through the test harness and
/// ignores an already-installed subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("occlude=debug"))
        .with_test_writer()
        .try_init();
}
