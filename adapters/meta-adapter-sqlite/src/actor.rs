//! Users and group memberships

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use agora_types::actor_adapter::Actor;
use agora_types::prelude::*;

pub(crate) async fn read(db: &SqlitePool, user_id: &str) -> AgResult<Actor> {
	let res = sqlx::query("SELECT is_superuser, lang FROM users WHERE user_id=?")
		.bind(user_id)
		.fetch_one(db)
		.await;
	let (is_superuser, lang) = map_res(res, |row| {
		Ok((row.try_get::<bool, _>("is_superuser")?, row.try_get::<Option<String>, _>("lang")?))
	})?;

	let rows = sqlx::query("SELECT group_name FROM user_groups WHERE user_id=? ORDER BY group_name")
		.bind(user_id)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	let groups: Vec<Box<str>> =
		collect_res(rows.iter().map(|row| row.try_get::<String, _>("group_name").map(Into::into)))?;

	Ok(Actor {
		id: Some(user_id.into()),
		groups: groups.into_boxed_slice(),
		is_superuser,
		lang: lang.map(Into::into),
	})
}

pub(crate) async fn create(db: &SqlitePool, user_id: &str, is_superuser: bool) -> AgResult<()> {
	sqlx::query(
		"INSERT INTO users (user_id, is_superuser) VALUES (?, ?)
		ON CONFLICT(user_id) DO UPDATE SET is_superuser=excluded.is_superuser",
	)
	.bind(user_id)
	.bind(is_superuser)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn add_to_group(db: &SqlitePool, user_id: &str, group: &str) -> AgResult<()> {
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	let res = sqlx::query("SELECT user_id FROM users WHERE user_id=?")
		.bind(user_id)
		.fetch_one(&mut *tx)
		.await;
	map_res(res, |_| Ok(()))?;

	sqlx::query("INSERT OR IGNORE INTO groups (name) VALUES (?)")
		.bind(group)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_name) VALUES (?, ?)")
		.bind(user_id)
		.bind(group)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	tx.commit().await.map_err(|_| Error::DbError)?;
	Ok(())
}

// vim: ts=4
