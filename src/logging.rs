//! Tracing setup for processes embedding the engine.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global tracing subscriber formatting events to standard output.
///
/// The filter is taken from the `RUST_LOG` environment variable, falling
/// back to `info`. Call once at process start; the global subscriber can
/// only be set once, so a second call panics.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
