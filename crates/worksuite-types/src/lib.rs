//! Shared types, collaborator traits, and core utilities for Worksuite.
//!
//! This crate holds what the core and every adapter implementation agree on: the
//! error type, the setting scope model, and the interfaces of the external
//! collaborators (module metadata, settings persistence, clock).

#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod module_adapter;
pub mod prelude;
pub mod settings_adapter;
pub mod types;

// vim: ts=4
