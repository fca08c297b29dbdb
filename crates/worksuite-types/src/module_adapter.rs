//! Module metadata provider. Supplies the catalog of installable business modules.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One installable module as described by deployment metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
	pub name: Box<str>,
	/// Fixed when the module is defined; not editable at runtime
	pub is_core_module: bool,
	#[serde(default)]
	pub enabled: bool,
}

impl ModuleDescriptor {
	pub fn core(name: impl Into<Box<str>>, enabled: bool) -> Self {
		Self { name: name.into(), is_core_module: true, enabled }
	}

	pub fn addon(name: impl Into<Box<str>>, enabled: bool) -> Self {
		Self { name: name.into(), is_core_module: false, enabled }
	}
}

/// Read-only view of the module catalog.
///
/// An unknown name is `None`, never an error. Callers treat it as "unavailable".
pub trait ModuleProvider: Debug + Send + Sync {
	fn find(&self, name: &str) -> Option<ModuleDescriptor>;

	fn all(&self) -> Vec<ModuleDescriptor>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_descriptor_manifest_format() {
		let desc: ModuleDescriptor =
			serde_json::from_str(r#"{"name":"HRCore","isCoreModule":true,"enabled":false}"#)
				.unwrap();
		assert_eq!(desc, ModuleDescriptor::core("HRCore", false));

		let desc: ModuleDescriptor =
			serde_json::from_str(r#"{"name":"SearchPlus","isCoreModule":false}"#).unwrap();
		assert!(!desc.enabled);
	}
}

// vim: ts=4
