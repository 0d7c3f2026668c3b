//! Permission grants

use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;

use crate::utils::*;
use agora_types::actor_adapter::Actor;
use agora_types::perm_store::{Capability, ObjectRef};
use agora_types::prelude::*;

pub(crate) async fn has_capability(
	db: &SqlitePool,
	actor: &Actor,
	capability: Capability,
	object: &ObjectRef,
) -> AgResult<bool> {
	if actor.groups.is_empty() {
		return Ok(false);
	}
	let (obj_type, obj_key) = object.to_key();

	let mut query = sqlx::QueryBuilder::new("SELECT 1 FROM grants WHERE obj_type=");
	query
		.push_bind(obj_type)
		.push(" AND obj_key=")
		.push_bind(obj_key)
		.push(" AND capability=")
		.push_bind(capability.as_str())
		.push(" AND group_name IN ");
	push_in(&mut query, &actor.groups[..]);
	query.push(" LIMIT 1");

	let row = query
		.build()
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(row.is_some())
}

pub(crate) async fn assign(
	db: &SqlitePool,
	capability: Capability,
	group: &str,
	object: &ObjectRef,
) -> AgResult<()> {
	let (obj_type, obj_key) = object.to_key();
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	sqlx::query("INSERT OR IGNORE INTO groups (name) VALUES (?)")
		.bind(group)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	sqlx::query(
		"INSERT OR IGNORE INTO grants (group_name, obj_type, obj_key, capability) VALUES (?, ?, ?, ?)",
	)
	.bind(group)
	.bind(obj_type)
	.bind(obj_key)
	.bind(capability.as_str())
	.execute(&mut *tx)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	tx.commit().await.map_err(|_| Error::DbError)?;
	Ok(())
}

pub(crate) async fn revoke(
	db: &SqlitePool,
	capability: Capability,
	group: &str,
	object: &ObjectRef,
) -> AgResult<()> {
	let (obj_type, obj_key) = object.to_key();
	sqlx::query("DELETE FROM grants WHERE group_name=? AND obj_type=? AND obj_key=? AND capability=?")
		.bind(group)
		.bind(obj_type)
		.bind(obj_key)
		.bind(capability.as_str())
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn capabilities_for(
	db: &SqlitePool,
	group: &str,
	object: &ObjectRef,
) -> AgResult<BTreeSet<Capability>> {
	let (obj_type, obj_key) = object.to_key();
	let rows =
		sqlx::query("SELECT capability FROM grants WHERE group_name=? AND obj_type=? AND obj_key=?")
			.bind(group)
			.bind(obj_type)
			.bind(obj_key)
			.fetch_all(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

	let caps = collect_res(rows.iter().map(|row| {
		row.try_get::<&str, _>("capability")?.parse::<Capability>().map_err(decode_err)
	}))?;
	Ok(caps.into_iter().collect())
}

pub(crate) async fn list_groups(db: &SqlitePool) -> AgResult<Vec<Box<str>>> {
	let rows = sqlx::query("SELECT name FROM groups ORDER BY name")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(|row| row.try_get::<String, _>("name").map(Into::into)))
}

pub(crate) async fn create_group(db: &SqlitePool, group: &str) -> AgResult<()> {
	sqlx::query("INSERT OR IGNORE INTO groups (name) VALUES (?)")
		.bind(group)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
