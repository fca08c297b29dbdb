//! Suite configuration
//!
//! Every field has a default, so a partial JSON document or an empty environment
//! still produces a usable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::prelude::*;

pub const ENV_DB: &str = "WORKSUITE_DB";
pub const ENV_MODULES: &str = "WORKSUITE_MODULES";
pub const ENV_CACHE_SCOPES: &str = "WORKSUITE_CACHE_SCOPES";
pub const ENV_RATE_WINDOW_SECS: &str = "WORKSUITE_RATE_WINDOW_SECS";
pub const ENV_GLOBAL_RATE_LIMIT: &str = "WORKSUITE_GLOBAL_RATE_LIMIT";
pub const ENV_USER_RATE_LIMIT: &str = "WORKSUITE_USER_RATE_LIMIT";
pub const ENV_AUDIT_MODULE: &str = "WORKSUITE_AUDIT_MODULE";
pub const ENV_TRACING: &str = "WORKSUITE_TRACING";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
	/// SQLite settings database, used when no settings adapter is supplied
	pub db_path: PathBuf,
	/// JSON module manifest, used when no module provider is supplied
	pub module_manifest: Option<PathBuf>,
	/// Number of settings scopes kept in the cache
	pub cache_scopes: usize,
	pub rate_window_secs: u64,
	pub default_global_rate_limit: u32,
	pub default_user_rate_limit: u32,
	/// Setting changes are audited while this module is available
	pub audit_module: Box<str>,
	pub init_tracing: bool,
}

impl Default for SuiteConfig {
	fn default() -> Self {
		Self {
			db_path: PathBuf::from("./data/settings.db"),
			module_manifest: None,
			cache_scopes: 256,
			rate_window_secs: 60,
			default_global_rate_limit: 60,
			default_user_rate_limit: 10,
			audit_module: "Auditing".into(),
			init_tracing: false,
		}
	}
}

impl SuiteConfig {
	/// Read the configuration from `WORKSUITE_*` environment variables
	pub fn from_env() -> SuiteResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Parse a JSON configuration document
	pub fn from_json(json: &str) -> SuiteResult<Self> {
		serde_json::from_str(json).map_err(|err| Error::ConfigError(format!("invalid configuration: {}", err)))
	}

	pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SuiteResult<Self> {
		let mut config = Self::default();

		if let Some(db_path) = lookup(ENV_DB) {
			config.db_path = PathBuf::from(db_path);
		}
		if let Some(manifest) = lookup(ENV_MODULES).filter(|s| !s.is_empty()) {
			config.module_manifest = Some(PathBuf::from(manifest));
		}
		if let Some(value) = lookup(ENV_CACHE_SCOPES) {
			config.cache_scopes = parse_var(ENV_CACHE_SCOPES, &value)?;
		}
		if let Some(value) = lookup(ENV_RATE_WINDOW_SECS) {
			config.rate_window_secs = parse_var(ENV_RATE_WINDOW_SECS, &value)?;
		}
		if let Some(value) = lookup(ENV_GLOBAL_RATE_LIMIT) {
			config.default_global_rate_limit = parse_var(ENV_GLOBAL_RATE_LIMIT, &value)?;
		}
		if let Some(value) = lookup(ENV_USER_RATE_LIMIT) {
			config.default_user_rate_limit = parse_var(ENV_USER_RATE_LIMIT, &value)?;
		}
		if let Some(module) = lookup(ENV_AUDIT_MODULE) {
			config.audit_module = module.into();
		}
		if let Some(value) = lookup(ENV_TRACING) {
			config.init_tracing = parse_flag(ENV_TRACING, &value)?;
		}

		Ok(config)
	}

	pub fn rate_window(&self) -> Duration {
		Duration::from_secs(self.rate_window_secs)
	}
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> SuiteResult<T> {
	value
		.trim()
		.parse()
		.map_err(|_| Error::ConfigError(format!("{}: invalid value '{}'", name, value)))
}

fn parse_flag(name: &str, value: &str) -> SuiteResult<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"" | "0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error::ConfigError(format!("{}: invalid flag '{}'", name, value))),
	}
}


// vim: ts=4
