//! SQLite storage for Agora.
//!
//! One database file holds the menu, the permission grants and the users.
//! Implements `MenuAdapter`, `PermissionStore` and `ActorAdapter`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod actor;
mod menu;
mod perm;
mod schema;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::collections::BTreeSet;
use std::path::Path;

use agora_types::actor_adapter::{Actor, ActorAdapter};
use agora_types::menu::MenuItem;
use agora_types::menu_adapter::{CreateMenuItem, ItemPosition, MenuAdapter, UpdateMenuItemData};
use agora_types::perm_store::{Capability, ObjectRef, PermissionStore};
use agora_types::prelude::*;

const DB_FILE: &str = "agora.db";

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) the database inside `dir`.
	pub async fn new(dir: impl AsRef<Path>) -> AgResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DB: cannot open database: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DB: schema init failed: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		Ok(Self { db })
	}

	/// Registers a group so it shows up in permission listings before it holds any grant.
	pub async fn create_group(&self, group: &str) -> AgResult<()> {
		perm::create_group(&self.db, group).await
	}
}

#[async_trait]
impl MenuAdapter for MetaAdapterSqlite {
	async fn list_menu_items(&self) -> AgResult<Vec<MenuItem>> {
		menu::list(&self.db).await
	}

	async fn read_menu_item(&self, id: ItemId) -> AgResult<MenuItem> {
		menu::read(&self.db, id).await
	}

	async fn create_menu_item(&self, item: &CreateMenuItem) -> AgResult<ItemId> {
		menu::create(&self.db, item).await
	}

	async fn update_menu_item(&self, id: ItemId, data: &UpdateMenuItemData) -> AgResult<()> {
		menu::update(&self.db, id, data).await
	}

	async fn update_positions(&self, positions: &[ItemPosition]) -> AgResult<()> {
		menu::update_positions(&self.db, positions).await
	}

	async fn delete_menu_items(&self, ids: &[ItemId], positions: &[ItemPosition]) -> AgResult<()> {
		menu::delete(&self.db, ids, positions).await
	}
}

#[async_trait]
impl PermissionStore for MetaAdapterSqlite {
	async fn has_capability(
		&self,
		actor: &Actor,
		capability: Capability,
		object: &ObjectRef,
	) -> AgResult<bool> {
		perm::has_capability(&self.db, actor, capability, object).await
	}

	async fn assign(&self, capability: Capability, group: &str, object: &ObjectRef) -> AgResult<()> {
		perm::assign(&self.db, capability, group, object).await
	}

	async fn revoke(&self, capability: Capability, group: &str, object: &ObjectRef) -> AgResult<()> {
		perm::revoke(&self.db, capability, group, object).await
	}

	async fn capabilities_for(
		&self,
		group: &str,
		object: &ObjectRef,
	) -> AgResult<BTreeSet<Capability>> {
		perm::capabilities_for(&self.db, group, object).await
	}

	async fn list_groups(&self) -> AgResult<Vec<Box<str>>> {
		perm::list_groups(&self.db).await
	}
}

#[async_trait]
impl ActorAdapter for MetaAdapterSqlite {
	async fn read_actor(&self, user_id: &str) -> AgResult<Actor> {
		actor::read(&self.db, user_id).await
	}

	async fn create_user(&self, user_id: &str, is_superuser: bool) -> AgResult<()> {
		actor::create(&self.db, user_id, is_superuser).await
	}

	async fn add_user_to_group(&self, user_id: &str, group: &str) -> AgResult<()> {
		actor::add_to_group(&self.db, user_id, group).await
	}
}

// vim: ts=4
