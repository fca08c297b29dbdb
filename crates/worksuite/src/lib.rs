//! Worksuite is a modular back-office suite built from pluggable business modules.
//!
//! This crate assembles the runtime every module relies on:
//!
//! - the module registry and add-on capability resolution
//! - the layered settings store (global, per-module and per-user scopes)
//! - the rate gate for expensive features
//!
//! ```no_run
//! # async fn run() -> worksuite::error::SuiteResult<()> {
//! use worksuite::{SuiteBuilder, SuiteConfig};
//!
//! let mut builder = SuiteBuilder::new(SuiteConfig::from_env()?);
//! builder.module_manifest("./modules.json");
//! let suite = builder.build().await?;
//!
//! if suite.addons.is_module_available("SearchPlus") {
//! 	let _depth = suite.settings.module("SearchPlus").get_int("searchplus.depth", 3).await?;
//! }
//! suite.teardown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod logging;
pub mod prelude;

pub use worksuite_core as core;
pub use worksuite_types::{clock, error, module_adapter, settings_adapter, types};

pub use app::{Suite, SuiteBuilder, SuiteState, VERSION};
pub use config::SuiteConfig;
pub use logging::init_tracing;

// vim: ts=4
