//! SQLite settings adapter for Worksuite
//!
//! Persists global, module and user scoped settings in a single `settings` table.

#![forbid(unsafe_code)]

mod schema;
mod setting;

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use worksuite_types::prelude::*;
use worksuite_types::settings_adapter::{SettingEntry, SettingScope, SettingsAdapter};

use crate::schema::init_db;

#[derive(Debug)]
pub struct SettingsAdapterSqlite {
	db: SqlitePool,
}

impl SettingsAdapterSqlite {
	/// Open (or create) the database file at `path` and make sure the schema exists
	pub async fn new(path: impl AsRef<Path>) -> SuiteResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|err| Error::PersistenceFailure(err.to_string()))?;

		init_db(&db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|err| Error::PersistenceFailure(err.to_string()))?;

		info!("Settings database opened: {}", path.display());
		Ok(Self { db })
	}
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterSqlite {
	async fn list_settings(&self, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
		setting::list(&self.db, scope).await
	}

	async fn upsert_setting(
		&self,
		scope: &SettingScope,
		key: &str,
		value: &serde_json::Value,
		updated_at: Timestamp,
	) -> SuiteResult<()> {
		setting::upsert(&self.db, scope, key, value, updated_at).await
	}

	async fn delete_setting(&self, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
		setting::delete(&self.db, scope, key).await
	}

	async fn close(&self) {
		self.db.close().await;
		debug!("Settings database closed");
	}
}

// vim: ts=4
