//! Logging setup.
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber. Filter via `RUST_LOG` (default: `info`), e.g.
//! `RUST_LOG=energy_desk=debug desk allocate --input load.csv`.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr subscriber. Call once from `main`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Stdout carries the reports, so logs go to stderr.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose subscriber for tests (captured by the test harness).
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
