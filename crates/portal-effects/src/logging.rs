//! Tracing subscriber setup for native hosts

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Calling this
/// more than once is harmless: later calls leave the first subscriber in
/// place and return `false`.
pub fn init_tracing(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
