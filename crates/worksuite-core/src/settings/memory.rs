//! In-process settings adapter for ephemeral deployments and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::types::{SettingEntry, SettingScope};
use crate::prelude::*;
use worksuite_types::settings_adapter::SettingsAdapter;

#[derive(Debug, Default)]
pub struct MemorySettingsAdapter {
	rows: RwLock<BTreeMap<(SettingScope, Box<str>), SettingEntry>>,
}

impl MemorySettingsAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.rows.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.read().is_empty()
	}
}

#[async_trait]
impl SettingsAdapter for MemorySettingsAdapter {
	async fn list_settings(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
		Ok(self.rows.read().values().filter(|entry| &entry.scope == scope).cloned().collect())
	}

	async fn upsert_setting(
		&self,
		scope: &SettingScope,
		key: &str,
		value: &serde_json::Value,
		updated_at: Timestamp,
	) -> SuiteResult<()> {
		let entry =
			SettingEntry { scope: scope.clone(), key: key.into(), value: value.clone(), updated_at };
		self.rows.write().insert((scope.clone(), key.into()), entry);
		Ok(())
	}

	async fn delete_setting(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
		let row_key: (SettingScope, Box<str>) = (scope.clone(), key.into());
		Ok(self.rows.write().remove(&row_key).is_some())
	}
}

// vim: ts=4
