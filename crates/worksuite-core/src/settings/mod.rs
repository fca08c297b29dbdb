//! Layered settings with per-scope caching
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): scope model, value type assertions, category matching
//! - **Cache** (`cache.rs`): LRU of fully loaded scopes with a generation guard
//! - **Store** (`store.rs`): SettingsStore, the only component that mutates entries
//! - **Facade** (`facade.rs`): scope dispatch for application code
//! - **Hooks** (`hooks.rs`): module guard and audit trail around writes
//! - **Memory** (`memory.rs`): in-process adapter
//!
//! # Scopes
//!
//! - **Global**: instance-wide values (`all()` lists these)
//! - **Module**: values owned by one business module, which must be registered to be written
//! - **User**: per-user or per-tenant values

pub mod cache;
pub mod facade;
pub mod hooks;
pub mod memory;
pub mod store;
pub mod types;

pub use facade::{ScopedSettings, Settings};
pub use store::SettingsStore;
pub use types::{SettingEntry, SettingScope, ValueType};

// vim: ts=4
