//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_target(false)
		.try_init()
		.is_ok()
}

// vim: ts=4
