//! Add-on capability resolver
//!
//! Answers whether a business module may be used. Core modules are always
//! available; add-ons are available only while enabled. `is_addon_enabled` is the
//! strict check and stays false for a disabled core module, while
//! `is_module_available` is the gate application code should use.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::prelude::*;
use worksuite_types::module_adapter::{ModuleDescriptor, ModuleProvider};

/// Classification of a module name for diagnostics and admin screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
	Core,
	Addon,
	Unknown,
}

impl ModuleType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ModuleType::Core => "core",
			ModuleType::Addon => "addon",
			ModuleType::Unknown => "unknown",
		}
	}
}

impl std::fmt::Display for ModuleType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone)]
pub struct AddonService {
	provider: Arc<dyn ModuleProvider>,
}

impl AddonService {
	pub fn new(provider: Arc<dyn ModuleProvider>) -> Self {
		Self { provider }
	}

	/// Registered and enabled, regardless of the core flag
	pub fn is_addon_enabled(&self, name: &str) -> bool {
		self.provider.find(name).is_some_and(|m| m.enabled)
	}

	pub fn is_core_module(&self, name: &str) -> bool {
		self.provider.find(name).is_some_and(|m| m.is_core_module)
	}

	pub fn is_module_available(&self, name: &str) -> bool {
		self.is_core_module(name) || self.is_addon_enabled(name)
	}

	/// Every core module, enabled or not
	pub fn get_core_modules(&self) -> BTreeSet<Box<str>> {
		self.provider.all().into_iter().filter(|m| m.is_core_module).map(|m| m.name).collect()
	}

	/// Enabled modules that are not core
	pub fn get_enabled_addons(&self) -> BTreeSet<Box<str>> {
		self.provider
			.all()
			.into_iter()
			.filter(|m| m.enabled && !m.is_core_module)
			.map(|m| m.name)
			.collect()
	}

	pub fn get_module_type(&self, name: &str) -> ModuleType {
		match self.provider.find(name) {
			Some(m) if m.is_core_module => ModuleType::Core,
			Some(_) => ModuleType::Addon,
			None => ModuleType::Unknown,
		}
	}

	/// Descriptor of a module that must exist
	pub fn require_module(&self, name: &str) -> SuiteResult<ModuleDescriptor> {
		self.provider.find(name).ok_or_else(|| Error::ModuleNotRegistered(name.into()))
	}

	/// Route guard: deny access to the feature area of an unavailable module
	pub fn ensure_available(&self, name: &str) -> SuiteResult<()> {
		if self.is_module_available(name) {
			Ok(())
		} else {
			debug!("Access to module '{}' denied: not available", name);
			Err(Error::PermissionDenied)
		}
	}
}


// vim: ts=4
