//! Common test utilities
//!
//! `FlakyAdapter` wraps the in-memory adapter and fails on demand, so persistence
//! failures can be injected per operation and per key.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use worksuite_core::settings::memory::MemorySettingsAdapter;
use worksuite_core::settings::{SettingEntry, SettingScope, SettingsStore};
use worksuite_types::error::{Error, SuiteResult};
use worksuite_types::settings_adapter::SettingsAdapter;
use worksuite_types::types::Timestamp;

#[derive(Debug, Default)]
pub struct FlakyAdapter {
	pub inner: MemorySettingsAdapter,
	pub fail_reads: AtomicBool,
	pub fail_deletes: AtomicBool,
	pub failing_keys: Mutex<HashSet<String>>,
	pub list_calls: AtomicUsize,
}

impl FlakyAdapter {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn fail_key(&self, key: &str) {
		self.failing_keys.lock().insert(key.to_string());
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	/// Write straight to storage, bypassing any store cache (another process)
	pub async fn inner_set(&self, scope: &SettingScope, key: &str, value: serde_json::Value) {
		let _ = self.inner.upsert_setting(scope, key, &value, Timestamp(0)).await;
	}
}

#[async_trait]
impl SettingsAdapter for FlakyAdapter {
	async fn list_settings(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_reads.load(Ordering::SeqCst) {
			return Err(Error::PersistenceFailure("connection refused".into()));
		}
		self.inner.list_settings(scope).await
	}

	async fn upsert_setting(
		&self,
		scope: &SettingScope,
		key: &str,
		value: &serde_json::Value,
		updated_at: Timestamp,
	) -> SuiteResult<()> {
		if self.failing_keys.lock().contains(key) {
			return Err(Error::PersistenceFailure(format!("cannot write {}", key)));
		}
		self.inner.upsert_setting(scope, key, value, updated_at).await
	}

	async fn delete_setting(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
		if self.fail_deletes.load(Ordering::SeqCst) {
			return Err(Error::PersistenceFailure("disk full".into()));
		}
		self.inner.delete_setting(scope, key).await
	}
}

/// Persists normally but parks one chosen write after it reached storage, until released
#[derive(Debug, Default)]
pub struct StallingAdapter {
	pub inner: MemorySettingsAdapter,
	stall_upsert_of: Option<serde_json::Value>,
	stall_delete: bool,
	armed: AtomicBool,
	/// Signalled once the parked write is persisted
	pub stalled: Notify,
	/// Lets the parked write return
	pub release: Notify,
}

impl StallingAdapter {
	pub fn on_upsert_of(value: serde_json::Value) -> Arc<Self> {
		Arc::new(Self { stall_upsert_of: Some(value), armed: AtomicBool::new(true), ..Self::default() })
	}

	pub fn on_delete() -> Arc<Self> {
		Arc::new(Self { stall_delete: true, armed: AtomicBool::new(true), ..Self::default() })
	}

	async fn park(&self) {
		if self.armed.swap(false, Ordering::SeqCst) {
			self.stalled.notify_one();
			self.release.notified().await;
		}
	}
}

#[async_trait]
impl SettingsAdapter for StallingAdapter {
	async fn list_settings(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
		self.inner.list_settings(scope).await
	}

	async fn upsert_setting(
		&self,
		scope: &SettingScope,
		key: &str,
		value: &serde_json::Value,
		updated_at: Timestamp,
	) -> SuiteResult<()> {
		self.inner.upsert_setting(scope, key, value, updated_at).await?;
		if self.stall_upsert_of.as_ref() == Some(value) {
			self.park().await;
		}
		Ok(())
	}

	async fn delete_setting(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
		let existed = self.inner.delete_setting(scope, key).await?;
		if self.stall_delete {
			self.park().await;
		}
		Ok(existed)
	}
}

pub fn store_over(adapter: Arc<FlakyAdapter>) -> Arc<SettingsStore> {
	Arc::new(SettingsStore::new(adapter, 32))
}

// vim: ts=4
