//! Settings rows
//!
//! One row per `(scope, module, owner_id, key)`. Values are stored as JSON text.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use worksuite_types::prelude::*;
use worksuite_types::settings_adapter::{SettingEntry, SettingScope};

/// Column values identifying a scope
struct ScopeColumns<'a> {
	kind: &'static str,
	module: &'a str,
	owner_id: i64,
}

fn scope_columns(scope: &SettingScope) -> SuiteResult<ScopeColumns<'_>> {
	let owner_id = match scope.owner_id() {
		Some(OwnerId(id)) => i64::try_from(id)
			.map_err(|_| Error::ValidationError(format!("owner id {} out of range", id)))?,
		None => 0,
	};
	Ok(ScopeColumns { kind: scope.kind(), module: scope.module_name().unwrap_or(""), owner_id })
}

fn db_error(err: sqlx::Error) -> Error {
	warn!("DB: {:#?}", err);
	Error::PersistenceFailure(err.to_string())
}

fn read_entry(scope: &SettingScope, row: &SqliteRow) -> SuiteResult<SettingEntry> {
	let key: String = row.try_get("key").map_err(db_error)?;
	let value: String = row.try_get("value").map_err(db_error)?;
	let updated_at: i64 = row.try_get("updated_at").map_err(db_error)?;

	let value = serde_json::from_str(&value).map_err(|err| {
		warn!("DB: corrupt value for {} / {}: {}", scope, key, err);
		Error::PersistenceFailure(format!("corrupt value for key '{}'", key))
	})?;

	Ok(SettingEntry { scope: scope.clone(), key: key.into(), value, updated_at: Timestamp(updated_at) })
}

/// List every setting stored for a scope
pub(crate) async fn list(db: &SqlitePool, scope: &SettingScope) -> SuiteResult<Vec<SettingEntry>> {
	let cols = scope_columns(scope)?;
	let rows = sqlx::query(
		"SELECT key, value, updated_at FROM settings
		WHERE scope = ? AND module = ? AND owner_id = ?
		ORDER BY key",
	)
	.bind(cols.kind)
	.bind(cols.module)
	.bind(cols.owner_id)
	.fetch_all(db)
	.await
	.map_err(db_error)?;

	rows.iter().map(|row| read_entry(scope, row)).collect()
}

/// Insert or replace a single setting
pub(crate) async fn upsert(
	db: &SqlitePool,
	scope: &SettingScope,
	key: &str,
	value: &serde_json::Value,
	updated_at: Timestamp,
) -> SuiteResult<()> {
	let cols = scope_columns(scope)?;
	let value = serde_json::to_string(value)?;

	sqlx::query(
		"INSERT INTO settings (scope, module, owner_id, key, value, updated_at)
		VALUES (?, ?, ?, ?, ?, ?)
		ON CONFLICT(scope, module, owner_id, key)
		DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
	)
	.bind(cols.kind)
	.bind(cols.module)
	.bind(cols.owner_id)
	.bind(key)
	.bind(value)
	.bind(updated_at.0)
	.execute(db)
	.await
	.map_err(db_error)?;

	Ok(())
}

/// Delete a single setting. Returns whether a row was removed.
pub(crate) async fn delete(db: &SqlitePool, scope: &SettingScope, key: &str) -> SuiteResult<bool> {
	let cols = scope_columns(scope)?;
	let res = sqlx::query("DELETE FROM settings WHERE scope = ? AND module = ? AND owner_id = ? AND key = ?")
		.bind(cols.kind)
		.bind(cols.module)
		.bind(cols.owner_id)
		.bind(key)
		.execute(db)
		.await
		.map_err(db_error)?;

	Ok(res.rows_affected() > 0)
}

// vim: ts=4
