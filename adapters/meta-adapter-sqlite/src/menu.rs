//! Menu item storage
//!
//! Items are stored flat with a `parent_id` back-reference; the tree is built
//! by the caller.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use agora_types::menu::{LocalizedText, MenuItem, MenuTarget, MenuType};
use agora_types::menu_adapter::{CreateMenuItem, ItemPosition, UpdateMenuItemData};
use agora_types::perm_store::MENU_ITEM_CONTENT_TYPE;
use agora_types::prelude::*;

const ITEM_COLUMNS: &str =
	"item_id, title_en, title_de, link, document_id, parent_id, menu_type, ord";

fn item_from_row(row: &SqliteRow) -> Result<MenuItem, sqlx::Error> {
	let menu_type = MenuType::from_code(row.try_get("menu_type")?).map_err(decode_err)?;
	let link: Option<String> = row.try_get("link")?;
	let document: Option<i64> = row.try_get("document_id")?;
	let target = match (link, document) {
		(Some(link), _) if !link.is_empty() => Some(MenuTarget::Link(link.into())),
		(_, Some(doc)) => Some(MenuTarget::Document(DocumentId(doc))),
		_ => None,
	};

	Ok(MenuItem {
		id: ItemId(row.try_get("item_id")?),
		title: LocalizedText::new(
			row.try_get::<String, _>("title_en")?,
			row.try_get::<String, _>("title_de")?,
		),
		order: row.try_get("ord")?,
		target,
		parent: row.try_get::<Option<i64>, _>("parent_id")?.map(ItemId),
		menu_type,
	})
}

pub(crate) async fn list(db: &SqlitePool) -> AgResult<Vec<MenuItem>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM menu_items ORDER BY menu_type, parent_id, ord, item_id",
		ITEM_COLUMNS
	))
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(item_from_row))
}

pub(crate) async fn read(db: &SqlitePool, id: ItemId) -> AgResult<MenuItem> {
	let res = sqlx::query(&format!("SELECT {} FROM menu_items WHERE item_id = ?", ITEM_COLUMNS))
		.bind(id.0)
		.fetch_one(db)
		.await;

	map_res(res, |row| item_from_row(&row))
}

pub(crate) async fn create(db: &SqlitePool, item: &CreateMenuItem) -> AgResult<ItemId> {
	let res = sqlx::query(
		"INSERT INTO menu_items (title_en, title_de, link, document_id, parent_id, menu_type, ord)
		VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING item_id",
	)
	.bind(item.title.en.as_ref())
	.bind(item.title.de.as_ref())
	.bind(item.target.as_ref().and_then(MenuTarget::link))
	.bind(item.target.as_ref().and_then(MenuTarget::document).map(|d| d.0))
	.bind(item.parent.map(|p| p.0))
	.bind(item.menu_type.as_code())
	.bind(item.order)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(ItemId(res.get(0)))
}

pub(crate) async fn update(db: &SqlitePool, id: ItemId, data: &UpdateMenuItemData) -> AgResult<()> {
	let mut query = sqlx::QueryBuilder::new("UPDATE menu_items SET ");
	let mut has_updates = false;

	if matches!(data.title_en, Patch::Null) {
		return Err(Error::ValidationError("title_en is required".into()));
	}
	has_updates = push_patch!(query, has_updates, "title_en", &data.title_en, |v| v.as_ref());
	// German titles are optional; clearing stores an empty string
	has_updates = match &data.title_de {
		Patch::Undefined => has_updates,
		patch => {
			if has_updates {
				query.push(", ");
			}
			query.push("title_de=").push_bind(patch.value().map_or("", |v| v.as_ref()));
			true
		}
	};

	// Both target columns are written together so they never disagree
	if let Some(target) = data.target.as_change() {
		if has_updates {
			query.push(", ");
		}
		query
			.push("link=")
			.push_bind(target.and_then(MenuTarget::link))
			.push(", document_id=")
			.push_bind(target.and_then(MenuTarget::document).map(|d| d.0));
		has_updates = true;
	}

	has_updates = push_patch!(query, has_updates, "parent_id", &data.parent, |v| v.0);
	if let Some(order) = data.order {
		if has_updates {
			query.push(", ");
		}
		query.push("ord=").push_bind(order);
		has_updates = true;
	}

	if !has_updates {
		return Ok(());
	}
	query.push(", updated_at=unixepoch() WHERE item_id=").push_bind(id.0);

	let res = query.build().execute(db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	Ok(())
}

async fn write_positions(
	tx: &mut sqlx::SqliteConnection,
	positions: &[ItemPosition],
) -> AgResult<()> {
	for pos in positions {
		let res = sqlx::query(
			"UPDATE menu_items SET parent_id=?, ord=?, updated_at=unixepoch() WHERE item_id=?",
		)
		.bind(pos.parent.map(|p| p.0))
		.bind(pos.order)
		.bind(pos.id.0)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		if res.rows_affected() == 0 {
			warn!(item = %pos.id, "Position update for missing menu item");
			return Err(Error::NotFound);
		}
	}
	Ok(())
}

/// Writes all positions in one transaction. Nothing is written if any item is missing.
pub(crate) async fn update_positions(db: &SqlitePool, positions: &[ItemPosition]) -> AgResult<()> {
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;
	write_positions(&mut tx, positions).await?;
	tx.commit().await.map_err(|_| Error::DbError)?;

	Ok(())
}

/// Moves the survivors, then removes `ids` together with their grants.
pub(crate) async fn delete(
	db: &SqlitePool,
	ids: &[ItemId],
	positions: &[ItemPosition],
) -> AgResult<()> {
	if ids.is_empty() {
		return Ok(());
	}
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;
	write_positions(&mut tx, positions).await?;

	let mut query = sqlx::QueryBuilder::new("DELETE FROM menu_items WHERE item_id IN ");
	push_in_ids(&mut query, ids);
	query.build().execute(&mut *tx).await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let keys: Vec<String> = ids.iter().map(ToString::to_string).collect();
	let mut query = sqlx::QueryBuilder::new("DELETE FROM grants WHERE obj_type=");
	query.push_bind(MENU_ITEM_CONTENT_TYPE).push(" AND obj_key IN ");
	push_in(&mut query, &keys);
	query.build().execute(&mut *tx).await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	tx.commit().await.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
