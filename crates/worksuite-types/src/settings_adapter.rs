//! Settings persistence adapter. Durable key/value rows with upsert and delete.
//!
//! Rows are keyed by `(scope, key)` where the scope carries the module name or owner id
//! it needs, so a module-scoped row without a module cannot be expressed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Namespace a setting lives in
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "lowercase")]
pub enum SettingScope {
	Global,
	Module(Box<str>),
	User(OwnerId),
}

impl SettingScope {
	pub fn module(name: impl Into<Box<str>>) -> Self {
		SettingScope::Module(name.into())
	}

	pub fn user(owner_id: OwnerId) -> Self {
		SettingScope::User(owner_id)
	}

	/// Scope kind as stored in the `scope` column
	pub fn kind(&self) -> &'static str {
		match self {
			SettingScope::Global => "global",
			SettingScope::Module(_) => "module",
			SettingScope::User(_) => "user",
		}
	}

	pub fn module_name(&self) -> Option<&str> {
		match self {
			SettingScope::Module(name) => Some(name),
			_ => None,
		}
	}

	pub fn owner_id(&self) -> Option<OwnerId> {
		match self {
			SettingScope::User(owner_id) => Some(*owner_id),
			_ => None,
		}
	}
}

impl std::fmt::Display for SettingScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SettingScope::Global => write!(f, "global"),
			SettingScope::Module(name) => write!(f, "module:{}", name),
			SettingScope::User(owner_id) => write!(f, "user:{}", owner_id),
		}
	}
}

/// Stored setting row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingEntry {
	pub scope: SettingScope,
	pub key: Box<str>,
	pub value: serde_json::Value,
	pub updated_at: Timestamp,
}

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// All rows of one scope
	async fn list_settings(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>>;

	/// Insert or replace the row keyed by `(scope, key)`
	async fn upsert_setting(
		&self,
		scope: &SettingScope,
		key: &str,
		value: &serde_json::Value,
		updated_at: Timestamp,
	) -> SuiteResult<()>;

	/// Remove a row. Returns whether a row existed.
	async fn delete_setting(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool>;

	/// Release held resources (connection pools etc.)
	async fn close(&self) {}
}


// vim: ts=4
