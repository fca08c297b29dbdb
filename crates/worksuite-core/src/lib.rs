//! Core of the Worksuite platform.
//!
//! Holds the policy side of the business-module system: which modules are installed
//! and usable, the layered settings store every module reads its configuration from,
//! and the rate gate guarding expensive features. Request handling, rendering and
//! persistence live elsewhere and reach this crate only through the collaborator
//! traits in `worksuite-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod addon;
pub mod prelude;
pub mod rate_limit;
pub mod registry;
pub mod settings;

// Re-export commonly used types
pub use addon::{AddonService, ModuleType};
pub use rate_limit::{Admission, RateGate, RateGateConfig};
pub use registry::ModuleRegistry;
pub use settings::{ScopedSettings, SettingScope, Settings, SettingsStore};

// vim: ts=4
