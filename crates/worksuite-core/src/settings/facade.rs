//! Settings facade
//!
//! Application code reads and writes settings through `Settings` and never names a
//! scope explicitly: plain calls address global settings, `module(..)` and `user(..)`
//! return handles bound to the respective scope.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::store::SettingsStore;
use super::types::{SettingEntry, SettingScope};
use crate::prelude::*;

#[derive(Clone)]
pub struct Settings {
	store: Arc<SettingsStore>,
}

impl Settings {
	pub fn new(store: Arc<SettingsStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<SettingsStore> {
		&self.store
	}

	pub fn global(&self) -> ScopedSettings<'_> {
		self.scoped(SettingScope::Global)
	}

	pub fn module(&self, name: impl Into<Box<str>>) -> ScopedSettings<'_> {
		self.scoped(SettingScope::Module(name.into()))
	}

	pub fn user(&self, owner_id: OwnerId) -> ScopedSettings<'_> {
		self.scoped(SettingScope::User(owner_id))
	}

	pub fn scoped(&self, scope: SettingScope) -> ScopedSettings<'_> {
		ScopedSettings { store: &self.store, scope }
	}

	pub async fn get(&self, key: &str, default: Value) -> SuiteResult<Value> {
		self.global().get(key, default).await
	}

	pub async fn set(&self, key: &str, value: Value) -> SuiteResult<bool> {
		self.global().set(key, value).await
	}

	pub async fn get_multiple<K: AsRef<str>>(
		&self,
		keys: &[K],
	) -> SuiteResult<BTreeMap<Box<str>, Value>> {
		self.global().get_multiple(keys).await
	}

	pub async fn set_multiple<K, I>(&self, values: I) -> SuiteResult<bool>
	where
		K: AsRef<str>,
		I: IntoIterator<Item = (K, Value)>,
	{
		self.global().set_multiple(values).await
	}

	pub async fn get_by_category(&self, category: &str) -> SuiteResult<Vec<SettingEntry>> {
		self.global().get_by_category(category).await
	}

	pub async fn delete(&self, key: &str) -> SuiteResult<bool> {
		self.global().delete(key).await
	}

	/// Every global entry. Module and user entries are reached through their handles.
	pub async fn all(&self) -> SuiteResult<Vec<SettingEntry>> {
		self.global().all().await
	}

	pub async fn get_user_settings(&self, owner_id: OwnerId) -> SuiteResult<BTreeMap<Box<str>, Value>> {
		self.store.get_user_settings(owner_id).await
	}

	pub async fn refresh(&self) -> SuiteResult<()> {
		self.store.refresh().await
	}
}

/// Settings operations bound to one scope
pub struct ScopedSettings<'a> {
	store: &'a SettingsStore,
	scope: SettingScope,
}

impl ScopedSettings<'_> {
	pub fn scope(&self) -> &SettingScope {
		&self.scope
	}

	pub async fn get(&self, key: &str, default: Value) -> SuiteResult<Value> {
		self.store.get(&self.scope, key, default).await
	}

	pub async fn get_opt(&self, key: &str) -> SuiteResult<Option<Value>> {
		self.store.get_opt(&self.scope, key).await
	}

	pub async fn get_bool(&self, key: &str, default: bool) -> SuiteResult<bool> {
		self.store.get_bool(&self.scope, key, default).await
	}

	pub async fn get_int(&self, key: &str, default: i64) -> SuiteResult<i64> {
		self.store.get_int(&self.scope, key, default).await
	}

	pub async fn get_string(&self, key: &str, default: &str) -> SuiteResult<String> {
		self.store.get_string(&self.scope, key, default).await
	}

	pub async fn get_map(&self, key: &str) -> SuiteResult<Option<Map<String, Value>>> {
		self.store.get_map(&self.scope, key).await
	}

	pub async fn set(&self, key: &str, value: Value) -> SuiteResult<bool> {
		self.store.set(&self.scope, key, value).await
	}

	pub async fn get_multiple<K: AsRef<str>>(
		&self,
		keys: &[K],
	) -> SuiteResult<BTreeMap<Box<str>, Value>> {
		self.store.get_multiple(&self.scope, keys).await
	}

	pub async fn set_multiple<K, I>(&self, values: I) -> SuiteResult<bool>
	where
		K: AsRef<str>,
		I: IntoIterator<Item = (K, Value)>,
	{
		self.store.set_multiple(&self.scope, values).await
	}

	pub async fn get_by_category(&self, category: &str) -> SuiteResult<Vec<SettingEntry>> {
		self.store.get_by_category(&self.scope, category).await
	}

	pub async fn delete(&self, key: &str) -> SuiteResult<bool> {
		self.store.delete(&self.scope, key).await
	}

	pub async fn all(&self) -> SuiteResult<Vec<SettingEntry>> {
		self.store.entries(&self.scope).await
	}
}


// vim: ts=4
