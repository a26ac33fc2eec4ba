//! Tracing bootstrap for the CLI and examples.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Filtering comes from `YAWL_LOG`, falling back to `RUST_LOG`, defaulting
/// to `warn`. Output goes to stderr so it never mixes with pipeline bytes
/// on stdout. Calling this twice is harmless; the second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_env("YAWL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
