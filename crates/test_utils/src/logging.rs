//! Tracing setup for tests

use once_cell::sync::Lazy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed by another harness
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_test_writer())
        .try_init();
});

/// Installs a test-friendly tracing subscriber once per process
///
/// Honours `RUST_LOG`, defaulting to `warn`. Output goes through the test
/// harness so it is captured per test.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
