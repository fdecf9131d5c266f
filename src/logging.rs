//! Logging configuration for the gateway
//!
//! Thin wrapper around `tracing-subscriber` with env-filter support.
//! The gateway is a library plus a short-lived CLI, so there is no file
//! rotation here - stderr only.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "wialon_gateway=info";

/// Initialize logging from the environment.
///
/// Safe to call more than once; later calls are no-ops (tests set up
/// their own subscriber).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
