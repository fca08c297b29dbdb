//! Settings store with lazy per-scope caching, write hooks and typed reads
//!
//! Reads never create rows and resolve a missing key to the caller's default (or
//! `None`), but a failing adapter is always reported as an error. Writes go to the
//! adapter first and then update the cache synchronously, so a read that follows a
//! write in the same process sees the new value.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};

use super::cache::{ScopeEntries, SettingsCache};
use super::hooks::{SettingsHook, WriteEvent, WriteOp};
use super::types::{SettingEntry, SettingScope, ValueType, key_in_category};
use crate::prelude::*;
use worksuite_types::clock::{Clock, SystemClock};
use worksuite_types::settings_adapter::SettingsAdapter;

pub struct SettingsStore {
	adapter: Arc<dyn SettingsAdapter>,
	cache: SettingsCache,
	hooks: Vec<Arc<dyn SettingsHook>>,
	clock: Arc<dyn Clock>,
}

impl SettingsStore {
	pub fn new(adapter: Arc<dyn SettingsAdapter>, cache_scopes: usize) -> Self {
		Self {
			adapter,
			cache: SettingsCache::new(cache_scopes),
			hooks: Vec::new(),
			clock: Arc::new(SystemClock),
		}
	}

	/// Time source for `updated_at` stamps
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn with_hook(mut self, hook: Arc<dyn SettingsHook>) -> Self {
		debug!("Installing settings hook: {}", hook.name());
		self.hooks.push(hook);
		self
	}

	/// Loaded entries of a scope, from cache or persistence
	async fn scope_entries(&self, scope: &SettingScope) -> SuiteResult<Arc<ScopeEntries>> {
		if let Some(entries) = self.cache.get_scope(scope) {
			debug!("Settings cache hit: {}", scope);
			return Ok(entries);
		}

		let generation = self.cache.generation();
		let rows = self.adapter.list_settings(scope).await.inspect_err(|err| {
			warn!("Failed to load settings for {}: {}", scope, err);
		})?;
		let entries: Arc<ScopeEntries> =
			Arc::new(rows.into_iter().map(|entry| (entry.key.clone(), entry)).collect());

		if self.cache.install_scope(scope.clone(), entries.clone(), generation) {
			debug!("Loaded {} settings for {}", entries.len(), scope);
		} else {
			debug!("Discarded settings snapshot for {}: cache changed during load", scope);
		}
		Ok(entries)
	}

	/// Populate the cache for a scope ahead of first use
	pub async fn warm(&self, scope: &SettingScope) -> SuiteResult<()> {
		self.scope_entries(scope).await.map(|_| ())
	}

	pub async fn get_entry(&self, scope: &SettingScope, key: &str) -> SuiteResult<Option<SettingEntry>> {
		Ok(self.scope_entries(scope).await?.get(key).cloned())
	}

	pub async fn get_opt(&self, scope: &SettingScope, key: &str) -> SuiteResult<Option<Value>> {
		Ok(self.scope_entries(scope).await?.get(key).map(|entry| entry.value.clone()))
	}

	/// Stored value, or `default` unchanged when the key is absent
	pub async fn get(&self, scope: &SettingScope, key: &str, default: Value) -> SuiteResult<Value> {
		Ok(self.get_opt(scope, key).await?.unwrap_or(default))
	}

	/// Stored value asserted to be of `expected` type
	pub async fn get_typed(
		&self,
		scope: &SettingScope,
		key: &str,
		expected: ValueType,
	) -> SuiteResult<Option<Value>> {
		match self.get_opt(scope, key).await? {
			Some(value) => {
				let actual = ValueType::of(&value);
				if actual == expected {
					Ok(Some(value))
				} else {
					Err(invalid_type(key, expected, actual))
				}
			}
			None => Ok(None),
		}
	}

	pub async fn get_bool(&self, scope: &SettingScope, key: &str, default: bool) -> SuiteResult<bool> {
		match self.get_typed(scope, key, ValueType::Bool).await? {
			Some(Value::Bool(b)) => Ok(b),
			_ => Ok(default),
		}
	}

	pub async fn get_int(&self, scope: &SettingScope, key: &str, default: i64) -> SuiteResult<i64> {
		match self.get_typed(scope, key, ValueType::Int).await? {
			Some(value) => value.as_i64().ok_or_else(|| {
				// u64 above i64::MAX
				invalid_type(key, ValueType::Int, ValueType::Float)
			}),
			None => Ok(default),
		}
	}

	pub async fn get_string(
		&self,
		scope: &SettingScope,
		key: &str,
		default: &str,
	) -> SuiteResult<String> {
		match self.get_typed(scope, key, ValueType::String).await? {
			Some(Value::String(s)) => Ok(s),
			_ => Ok(default.to_string()),
		}
	}

	pub async fn get_map(
		&self,
		scope: &SettingScope,
		key: &str,
	) -> SuiteResult<Option<Map<String, Value>>> {
		match self.get_typed(scope, key, ValueType::Map).await? {
			Some(Value::Object(map)) => Ok(Some(map)),
			_ => Ok(None),
		}
	}

	/// Batch read. Missing keys are left out of the result.
	pub async fn get_multiple<K: AsRef<str>>(
		&self,
		scope: &SettingScope,
		keys: &[K],
	) -> SuiteResult<BTreeMap<Box<str>, Value>> {
		let entries = self.scope_entries(scope).await?;
		Ok(keys
			.iter()
			.filter_map(|key| entries.get(key.as_ref()))
			.map(|entry| (entry.key.clone(), entry.value.clone()))
			.collect())
	}

	/// Entries whose key belongs to `category`, ordered by key
	pub async fn get_by_category(
		&self,
		scope: &SettingScope,
		category: &str,
	) -> SuiteResult<Vec<SettingEntry>> {
		let entries = self.scope_entries(scope).await?;
		Ok(entries
			.values()
			.filter(|entry| key_in_category(&entry.key, category))
			.cloned()
			.collect())
	}

	/// Every entry of one scope, ordered by key
	pub async fn entries(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
		Ok(self.scope_entries(scope).await?.values().cloned().collect())
	}

	/// Key/value mapping of one user, no defaults applied
	pub async fn get_user_settings(&self, owner_id: OwnerId) -> SuiteResult<BTreeMap<Box<str>, Value>> {
		let entries = self.scope_entries(&SettingScope::User(owner_id)).await?;
		Ok(entries.iter().map(|(key, entry)| (key.clone(), entry.value.clone())).collect())
	}

	/// Upsert a value.
	///
	/// `Ok(false)` means the adapter failed (logged, nothing cached). Errors are reserved
	/// for rejected preconditions such as a hook refusing the write.
	pub async fn set(&self, scope: &SettingScope, key: &str, value: Value) -> SuiteResult<bool> {
		if key.is_empty() {
			return Err(Error::ValidationError("Setting key cannot be empty".into()));
		}

		let event = WriteEvent { scope, key, op: WriteOp::Set(&value) };
		self.before_write(&event).await?;

		let token = self.cache.generation();
		let updated_at = self.clock.now();
		if let Err(err) = self.adapter.upsert_setting(scope, key, &value, updated_at).await {
			warn!("Failed to store setting '{}' for {}: {}", key, scope, err);
			// the row may or may not have been written
			self.cache.invalidate_scope(scope);
			return Ok(false);
		}

		let entry = SettingEntry { scope: scope.clone(), key: key.into(), value: value.clone(), updated_at };
		if !self.cache.upsert_entry(entry, token) {
			debug!("Concurrent write to {}, dropped cached scope", scope);
		}
		info!("Setting '{}' updated for {}", key, scope);

		self.after_write(&event).await;
		Ok(true)
	}

	/// Upsert several values. Every key is attempted even after a failure; the result is
	/// `Ok(true)` only if all of them were stored. If a hook rejected any key, the first
	/// such error is returned once all keys have been attempted.
	pub async fn set_multiple<K, I>(&self, scope: &SettingScope, values: I) -> SuiteResult<bool>
	where
		K: AsRef<str>,
		I: IntoIterator<Item = (K, Value)>,
	{
		let mut all_stored = true;
		let mut first_err = None;

		for (key, value) in values {
			match self.set(scope, key.as_ref(), value).await {
				Ok(true) => {}
				Ok(false) => all_stored = false,
				Err(err) => {
					all_stored = false;
					first_err.get_or_insert(err);
				}
			}
		}

		match first_err {
			Some(err) => Err(err),
			None => Ok(all_stored),
		}
	}

	/// Remove a value. Returns whether a row existed; a persistence failure is an error
	/// because `false` already means nothing matched.
	pub async fn delete(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
		let event = WriteEvent { scope, key, op: WriteOp::Delete };
		self.before_write(&event).await?;

		let token = self.cache.generation();
		let existed = match self.adapter.delete_setting(scope, key).await {
			Ok(existed) => existed,
			Err(err) => {
				warn!("Failed to delete setting '{}' for {}: {}", key, scope, err);
				self.cache.invalidate_scope(scope);
				return Err(err);
			}
		};

		if !self.cache.remove_entry(scope, key, token) {
			debug!("Concurrent write to {}, dropped cached scope", scope);
		}
		if existed {
			info!("Setting '{}' deleted for {}", key, scope);
			self.after_write(&event).await;
		}
		Ok(existed)
	}

	/// Drop the cache and reload every scope that was cached
	pub async fn refresh(&self) -> SuiteResult<()> {
		let scopes = self.cache.clear();
		info!("Refreshing settings cache ({} scopes)", scopes.len());

		let results = join_all(scopes.iter().map(|scope| self.scope_entries(scope))).await;
		for res in results {
			res?;
		}
		Ok(())
	}

	/// Drop the cache and release the adapter
	pub async fn teardown(&self) {
		self.cache.clear();
		self.adapter.close().await;
		info!("Settings store shut down");
	}

	pub fn cached_scopes(&self) -> usize {
		self.cache.len()
	}

	async fn before_write(&self, event: &WriteEvent<'_>) -> SuiteResult<()> {
		for hook in &self.hooks {
			hook.before_write(event).await?;
		}
		Ok(())
	}

	async fn after_write(&self, event: &WriteEvent<'_>) {
		for hook in &self.hooks {
			hook.after_write(event).await;
		}
	}
}

fn invalid_type(key: &str, expected: ValueType, actual: ValueType) -> Error {
	Error::InvalidType { key: key.into(), expected: expected.name(), actual: actual.name() }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::memory::MemorySettingsAdapter;
	use serde_json::json;

	fn store() -> SettingsStore {
		SettingsStore::new(Arc::new(MemorySettingsAdapter::new()), 16)
	}

	#[tokio::test]
	async fn test_get_returns_default_without_creating_row() {
		let store = store();
		let scope = SettingScope::Global;
		assert_eq!(store.get(&scope, "missing", json!("dflt")).await.unwrap(), json!("dflt"));
		assert!(store.entries(&scope).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_set_then_get_nested() {
		let store = store();
		let scope = SettingScope::module("HRCore");
		let value = json!({ "policy": { "days": [1, 2, 3], "carry": null } });

		// load the scope first so the write must update the cached copy
		store.warm(&scope).await.unwrap();
		assert!(store.set(&scope, "hrcore.leave", value.clone()).await.unwrap());
		assert_eq!(store.get(&scope, "hrcore.leave", json!(0)).await.unwrap(), value);
	}

	#[tokio::test]
	async fn test_scopes_are_isolated() {
		let store = store();
		store.set(&SettingScope::Global, "theme", json!("dark")).await.unwrap();
		store.set(&SettingScope::user(OwnerId(1)), "theme", json!("light")).await.unwrap();

		assert_eq!(store.get_opt(&SettingScope::Global, "theme").await.unwrap(), Some(json!("dark")));
		assert_eq!(
			store.get_opt(&SettingScope::user(OwnerId(1)), "theme").await.unwrap(),
			Some(json!("light"))
		);
		assert_eq!(store.get_opt(&SettingScope::user(OwnerId(2)), "theme").await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_typed_getters() {
		let store = store();
		let scope = SettingScope::Global;
		store.set(&scope, "limit", json!(5)).await.unwrap();
		store.set(&scope, "name", json!("acme")).await.unwrap();

		assert_eq!(store.get_int(&scope, "limit", 0).await.unwrap(), 5);
		assert_eq!(store.get_int(&scope, "absent", 7).await.unwrap(), 7);
		assert_eq!(store.get_string(&scope, "name", "").await.unwrap(), "acme");
		assert!(store.get_bool(&scope, "absent", true).await.unwrap());
		assert_eq!(store.get_map(&scope, "absent").await.unwrap(), None);

		let err = store.get_bool(&scope, "name", false).await.unwrap_err();
		assert!(matches!(
			err,
			Error::InvalidType { expected: "bool", actual: "string", ref key } if &**key == "name"
		));
	}

	#[tokio::test]
	async fn test_empty_key_rejected() {
		let store = store();
		let res = store.set(&SettingScope::Global, "", json!(1)).await;
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[tokio::test]
	async fn test_delete() {
		let store = store();
		let scope = SettingScope::Global;
		store.set(&scope, "k", json!(1)).await.unwrap();

		assert!(store.delete(&scope, "k").await.unwrap());
		assert_eq!(store.get(&scope, "k", json!("dflt")).await.unwrap(), json!("dflt"));
		assert!(!store.delete(&scope, "k").await.unwrap());
	}

	#[tokio::test]
	async fn test_refresh_reloads_cached_scopes() {
		let adapter = Arc::new(MemorySettingsAdapter::new());
		let store = SettingsStore::new(adapter.clone(), 16);
		let scope = SettingScope::Global;
		store.warm(&scope).await.unwrap();

		// another process writes behind our back
		adapter.upsert_setting(&scope, "k", &json!("external"), Timestamp(9)).await.unwrap();
		assert_eq!(store.get_opt(&scope, "k").await.unwrap(), None);

		store.refresh().await.unwrap();
		assert_eq!(store.cached_scopes(), 1);
		assert_eq!(store.get_opt(&scope, "k").await.unwrap(), Some(json!("external")));
	}
}

// vim: ts=4
