//! Process-local settings cache
//!
//! Holds fully loaded scopes in an LRU. A scope is either cached completely or not at
//! all, so a miss inside a cached scope means the key is absent. Writes update cached
//! scopes in place.
//!
//! Loads and writes take a token (`generation()`) before touching persistence. Every
//! change to a scope records the generation it happened at; a loaded snapshot or a
//! write-through whose token predates the last change of its scope is stale. A stale
//! snapshot is not installed, and a stale write-through drops the scope so the next
//! read goes back to persistence.

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::types::{SettingEntry, SettingScope};

pub type ScopeEntries = BTreeMap<Box<str>, SettingEntry>;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
	Some(v) => v,
	None => unreachable!(),
};

/// Per-scope change marks kept per cached scope slot before they are folded into `floor`
const TRACKED_PER_SLOT: usize = 4;

struct CacheInner {
	scopes: LruCache<SettingScope, Arc<ScopeEntries>>,
	/// Generation of the last change of each recently changed scope
	changed: HashMap<SettingScope, u64>,
	generation: u64,
	/// Tokens older than this are stale for every scope
	floor: u64,
	max_tracked: usize,
}

impl CacheInner {
	fn is_current(&self, scope: &SettingScope, token: u64) -> bool {
		token >= self.floor && self.changed.get(scope).is_none_or(|&at| at <= token)
	}

	fn mark_changed(&mut self, scope: &SettingScope) {
		self.generation += 1;
		if self.changed.len() >= self.max_tracked && !self.changed.contains_key(scope) {
			self.changed.clear();
			self.floor = self.generation;
		}
		self.changed.insert(scope.clone(), self.generation);
	}
}

pub struct SettingsCache {
	inner: Mutex<CacheInner>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
		Self {
			inner: Mutex::new(CacheInner {
				scopes: LruCache::new(capacity),
				changed: HashMap::new(),
				generation: 0,
				floor: 0,
				max_tracked: capacity.get().saturating_mul(TRACKED_PER_SLOT),
			}),
		}
	}

	/// Token to pass back to `install_scope`, `upsert_entry` or `remove_entry`
	pub fn generation(&self) -> u64 {
		self.inner.lock().generation
	}

	pub fn get_scope(&self, scope: &SettingScope) -> Option<Arc<ScopeEntries>> {
		self.inner.lock().scopes.get(scope).cloned()
	}

	/// Install a freshly loaded scope. Returns false (and caches nothing) when the scope
	/// changed after `token` was taken.
	pub fn install_scope(&self, scope: SettingScope, entries: Arc<ScopeEntries>, token: u64) -> bool {
		let mut inner = self.inner.lock();
		if !inner.is_current(&scope, token) {
			return false;
		}
		inner.scopes.put(scope, entries);
		true
	}

	/// Write through a persisted value. When another change to the scope landed after
	/// `token`, the persisted order is unknown and the scope is dropped instead.
	pub fn upsert_entry(&self, entry: SettingEntry, token: u64) -> bool {
		let mut inner = self.inner.lock();
		let current = inner.is_current(&entry.scope, token);
		inner.mark_changed(&entry.scope);
		if !current {
			inner.scopes.pop(&entry.scope);
			return false;
		}
		if let Some(entries) = inner.scopes.get_mut(&entry.scope) {
			Arc::make_mut(entries).insert(entry.key.clone(), entry);
		}
		true
	}

	/// Write through a persisted removal, with the same staleness rule as `upsert_entry`
	pub fn remove_entry(&self, scope: &SettingScope, key: &str, token: u64) -> bool {
		let mut inner = self.inner.lock();
		let current = inner.is_current(scope, token);
		inner.mark_changed(scope);
		if !current {
			inner.scopes.pop(scope);
			return false;
		}
		if let Some(entries) = inner.scopes.get_mut(scope) {
			Arc::make_mut(entries).remove(key);
		}
		true
	}

	/// Drop one scope so the next access reloads it
	pub fn invalidate_scope(&self, scope: &SettingScope) {
		let mut inner = self.inner.lock();
		inner.mark_changed(scope);
		inner.scopes.pop(scope);
	}

	/// Drop everything. Returns the scopes that were cached.
	pub fn clear(&self) -> Vec<SettingScope> {
		let mut inner = self.inner.lock();
		inner.generation += 1;
		inner.floor = inner.generation;
		inner.changed.clear();
		let scopes = inner.scopes.iter().map(|(scope, _)| scope.clone()).collect();
		inner.scopes.clear();
		scopes
	}

	pub fn len(&self) -> usize {
		self.inner.lock().scopes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}


// vim: ts=4
