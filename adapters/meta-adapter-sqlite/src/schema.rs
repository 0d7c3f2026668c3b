//! Database schema initialization
//!
//! Creates the tables and indexes on first start. Every statement is
//! idempotent so `init_db` runs on each startup.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Menu items
	//************
	// `link` and `document_id` are mutually exclusive targets.
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS menu_items (
		item_id integer NOT NULL,
		title_en text NOT NULL,
		title_de text NOT NULL DEFAULT '',
		link text,
		document_id integer,
		parent_id integer,
		menu_type char(1) NOT NULL DEFAULT 'M',
		ord integer NOT NULL DEFAULT 0,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(item_id AUTOINCREMENT),
		CHECK(link IS NULL OR document_id IS NULL)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_menu_items_group ON menu_items(menu_type, parent_id, ord)",
	)
	.execute(&mut *tx)
	.await?;

	// Users and groups
	//******************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS groups (
		name text NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
		user_id text NOT NULL,
		is_superuser boolean NOT NULL DEFAULT 0,
		lang text,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_groups (
		user_id text NOT NULL,
		group_name text NOT NULL,
		PRIMARY KEY(user_id, group_name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Grants
	//********
	// One row per (group, object, capability). Objects are stored as a
	// type/key pair, see `ObjectRef::to_key`.
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS grants (
		group_name text NOT NULL,
		obj_type text NOT NULL,
		obj_key text NOT NULL,
		capability text NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(obj_type, obj_key, group_name, capability)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_grants_group ON grants(group_name)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
