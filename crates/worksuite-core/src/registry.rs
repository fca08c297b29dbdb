//! Module registry
//!
//! Adapts deployment metadata (a JSON manifest of module descriptors) into the
//! `ModuleProvider` interface. The core flag of a module is fixed once registered;
//! only the enabled flag can be changed by an administrator.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;

use crate::prelude::*;
use worksuite_types::module_adapter::{ModuleDescriptor, ModuleProvider};

#[derive(Debug, Default)]
pub struct ModuleRegistry {
	modules: RwLock<BTreeMap<Box<str>, ModuleDescriptor>>,
}

impl ModuleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a registry from descriptors. Duplicate names are rejected.
	pub fn from_descriptors(
		descriptors: impl IntoIterator<Item = ModuleDescriptor>,
	) -> SuiteResult<Self> {
		let registry = Self::new();
		for desc in descriptors {
			registry.register(desc)?;
		}
		Ok(registry)
	}

	/// Parse a JSON manifest: `[{"name": "...", "isCoreModule": bool, "enabled": bool}]`
	pub fn from_manifest(json: &str) -> SuiteResult<Self> {
		let descriptors: Vec<ModuleDescriptor> = serde_json::from_str(json)
			.map_err(|e| Error::ConfigError(format!("Invalid module manifest: {}", e)))?;
		Self::from_descriptors(descriptors)
	}

	/// Read a JSON manifest from disk
	pub async fn load(path: impl AsRef<Path>) -> SuiteResult<Self> {
		let path = path.as_ref();
		let json = tokio::fs::read_to_string(path).await.inspect_err(|err| {
			warn!("Cannot read module manifest {}: {}", path.display(), err);
		})?;
		let registry = Self::from_manifest(&json)?;
		info!("Loaded {} modules from {}", registry.len(), path.display());
		Ok(registry)
	}

	/// Serialize the current state back to manifest form
	pub fn to_manifest(&self) -> SuiteResult<String> {
		let modules = self.modules.read();
		let list: Vec<&ModuleDescriptor> = modules.values().collect();
		Ok(serde_json::to_string_pretty(&list)?)
	}

	/// Add a module at runtime
	pub fn register(&self, desc: ModuleDescriptor) -> SuiteResult<()> {
		let mut modules = self.modules.write();
		if modules.contains_key(&desc.name) {
			return Err(Error::ConfigError(format!("Module '{}' is already registered", desc.name)));
		}

		debug!(
			"Registering module: {} (core={}, enabled={})",
			desc.name, desc.is_core_module, desc.enabled
		);
		modules.insert(desc.name.clone(), desc);
		Ok(())
	}

	/// Administrator toggle for the enabled flag
	pub fn set_enabled(&self, name: &str, enabled: bool) -> SuiteResult<()> {
		let mut modules = self.modules.write();
		let desc = modules.get_mut(name).ok_or_else(|| Error::ModuleNotRegistered(name.into()))?;
		if desc.enabled != enabled {
			info!("Module '{}' {}", name, if enabled { "enabled" } else { "disabled" });
			desc.enabled = enabled;
		}
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.modules.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.read().is_empty()
	}
}

impl ModuleProvider for ModuleRegistry {
	fn find(&self, name: &str) -> Option<ModuleDescriptor> {
		self.modules.read().get(name).cloned()
	}

	fn all(&self) -> Vec<ModuleDescriptor> {
		self.modules.read().values().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MANIFEST: &str = r#"[
		{"name": "HRCore", "isCoreModule": true, "enabled": true},
		{"name": "SearchPlus", "isCoreModule": false, "enabled": true},
		{"name": "OldAddon", "isCoreModule": false, "enabled": false}
	]"#;

	#[test]
	fn test_from_manifest() {
		let registry = ModuleRegistry::from_manifest(MANIFEST).unwrap();
		assert_eq!(registry.len(), 3);
		assert_eq!(registry.find("HRCore"), Some(ModuleDescriptor::core("HRCore", true)));
		assert_eq!(registry.find("Missing"), None);
	}

	#[test]
	fn test_duplicate_module_rejected() {
		let res = ModuleRegistry::from_descriptors([
			ModuleDescriptor::addon("Crm", true),
			ModuleDescriptor::addon("Crm", false),
		]);
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_invalid_manifest() {
		assert!(matches!(ModuleRegistry::from_manifest("{"), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_set_enabled_keeps_core_flag() {
		let registry = ModuleRegistry::from_manifest(MANIFEST).unwrap();
		registry.set_enabled("HRCore", false).unwrap();
		let desc = registry.find("HRCore").unwrap();
		assert!(desc.is_core_module);
		assert!(!desc.enabled);
	}

	#[test]
	fn test_set_enabled_unknown_module() {
		let registry = ModuleRegistry::new();
		let res = registry.set_enabled("Ghost", true);
		assert!(matches!(res, Err(Error::ModuleNotRegistered(name)) if &*name == "Ghost"));
	}

	#[test]
	fn test_manifest_round_trip_keeps_state() {
		let registry = ModuleRegistry::from_manifest(MANIFEST).unwrap();
		registry.set_enabled("OldAddon", true).unwrap();
		let reloaded = ModuleRegistry::from_manifest(&registry.to_manifest().unwrap()).unwrap();
		assert_eq!(reloaded.all(), registry.all());
		assert!(reloaded.find("OldAddon").unwrap().enabled);
	}

	#[tokio::test]
	async fn test_load_from_file() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("modules.json");
		tokio::fs::write(&path, MANIFEST).await.unwrap();

		let registry = ModuleRegistry::load(&path).await.unwrap();
		assert_eq!(registry.len(), 3);

		let missing = ModuleRegistry::load(dir.path().join("nope.json")).await;
		assert!(matches!(missing, Err(Error::Io(_))));
	}
}

// vim: ts=4
