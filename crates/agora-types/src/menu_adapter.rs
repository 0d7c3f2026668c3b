//! Storage trait for menu items.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::menu::{LocalizedText, MenuItem, MenuTarget, MenuType};
use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct CreateMenuItem {
	pub title: LocalizedText,
	pub target: Option<MenuTarget>,
	pub parent: Option<ItemId>,
	pub menu_type: MenuType,
	pub order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMenuItemData {
	pub title_en: Patch<Box<str>>,
	pub title_de: Patch<Box<str>>,
	pub target: Patch<MenuTarget>,
	/// `Null` moves the item to the root level
	pub parent: Patch<ItemId>,
	pub order: Option<i32>,
}

/// Parent and sibling position of one item, as persisted after a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
	pub id: ItemId,
	pub parent: Option<ItemId>,
	pub order: i32,
}

#[async_trait]
pub trait MenuAdapter: Debug + Send + Sync {
	/// Every item of every menu. Callers build the tree from this snapshot.
	async fn list_menu_items(&self) -> AgResult<Vec<MenuItem>>;

	async fn read_menu_item(&self, id: ItemId) -> AgResult<MenuItem>;

	async fn create_menu_item(&self, item: &CreateMenuItem) -> AgResult<ItemId>;

	/// Field changes of a single item, written in one statement.
	async fn update_menu_item(&self, id: ItemId, data: &UpdateMenuItemData) -> AgResult<()>;

	/// Writes all positions in a single transaction.
	async fn update_positions(&self, positions: &[ItemPosition]) -> AgResult<()>;

	/// Applies `positions` then deletes `ids` (and their grants) in one transaction.
	async fn delete_menu_items(&self, ids: &[ItemId], positions: &[ItemPosition]) -> AgResult<()>;
}

// vim: ts=4
