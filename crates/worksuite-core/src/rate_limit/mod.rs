//! Request rate gate
//!
//! Fixed window counters with a global and a per-user tier. Limits come from the
//! settings store so they can be changed without a redeploy.

pub mod gate;
pub mod window;

pub use gate::{Admission, GLOBAL_RATE_LIMIT_KEY, RateGate, RateGateConfig, USER_RATE_LIMIT_KEY};
pub use window::FixedWindowCounter;

// vim: ts=4
