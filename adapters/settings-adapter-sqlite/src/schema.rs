//! Database schema initialization

use sqlx::SqlitePool;

/// Create the settings table and its indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Settings
	//**********
	// `module` is '' and `owner_id` is 0 where the scope does not use them, so the
	// primary key never contains NULLs.
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		scope text NOT NULL,
		module text NOT NULL DEFAULT '',
		owner_id integer NOT NULL DEFAULT 0,
		key text NOT NULL,
		value text NOT NULL,
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(scope, module, owner_id, key)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_settings_key ON settings(key)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
