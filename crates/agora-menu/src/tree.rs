//! In-memory menu tree.
//!
//! Items are indexed by id and by sibling group. Every mutation re-checks the
//! structural invariants, so callers may run their own checks first but never
//! have to rely on them:
//!
//! - an item with a link or document has no children,
//! - the parent chain of every item ends at a root,
//! - children share their parent's menu type, footer items have no parent.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::prelude::*;
use agora_types::menu_adapter::ItemPosition;

// GroupKey //
//**********//
/// Identifies a sibling group: the items sharing a parent within one menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
	pub menu_type: MenuType,
	pub parent: Option<ItemId>,
}

impl GroupKey {
	pub fn main(parent: Option<ItemId>) -> Self {
		Self { menu_type: MenuType::MainMenu, parent }
	}

	pub fn footer() -> Self {
		Self { menu_type: MenuType::Footer, parent: None }
	}

	pub fn of(item: &MenuItem) -> Self {
		Self { menu_type: item.menu_type, parent: item.parent }
	}
}

impl std::fmt::Display for GroupKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.parent {
			Some(parent) => write!(f, "{}:{}", self.menu_type.as_code(), parent),
			None => write!(f, "{}:root", self.menu_type.as_code()),
		}
	}
}

/// Why a structural change was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
	UnknownItem,
	UnknownParent,
	/// The new parent has a link or document
	ParentHasContent,
	/// The item has children and cannot take a link or document
	HasChildren,
	/// The new parent is the item itself or one of its descendants
	WouldCycle,
	MenuTypeMismatch,
	FooterParent,
}

impl Rejection {
	pub fn into_error(self, id: ItemId) -> Error {
		match self {
			Rejection::UnknownItem => Error::NotFound,
			Rejection::UnknownParent => {
				Error::ValidationError(format!("parent of item {} does not exist", id))
			}
			Rejection::ParentHasContent => Error::InvariantViolation(format!(
				"parent of item {} has a link or document and cannot have children",
				id
			)),
			Rejection::HasChildren => Error::InvariantViolation(format!(
				"item {} has children and cannot have a link or document",
				id
			)),
			Rejection::WouldCycle => Error::InvariantViolation(format!(
				"item {} cannot be moved below itself or its descendants",
				id
			)),
			Rejection::MenuTypeMismatch => Error::InvariantViolation(format!(
				"item {} must be in the same menu as its parent",
				id
			)),
			Rejection::FooterParent => {
				Error::InvariantViolation(format!("footer item {} cannot have a parent", id))
			}
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletePolicy {
	/// Remove the whole subtree
	#[default]
	Cascade,
	/// Hand the children to the removed item's parent
	Reparent,
}

#[derive(Debug, Default)]
pub struct Removal {
	pub removed: Vec<ItemId>,
	pub moved: Vec<ItemPosition>,
}

// Ancestors //
//***********//
/// Walks parent links lazily. Yields `Error::Cycle` once the walk is longer
/// than the tree, then stops.
pub struct Ancestors<'a> {
	tree: &'a MenuTree,
	origin: ItemId,
	next: Option<ItemId>,
	steps: usize,
}

impl Iterator for Ancestors<'_> {
	type Item = AgResult<ItemId>;

	fn next(&mut self) -> Option<Self::Item> {
		let id = self.next.take()?;
		if self.steps >= self.tree.items.len() {
			warn!(item = %self.origin, "Parent chain does not terminate");
			return Some(Err(Error::Cycle(self.origin)));
		}
		self.steps += 1;
		match self.tree.items.get(&id) {
			Some(item) => {
				self.next = item.parent;
				Some(Ok(id))
			}
			None => Some(Err(Error::NotFound)),
		}
	}
}

pub fn following_order(order: i32) -> AgResult<i32> {
	order
		.checked_add(1)
		.ok_or_else(|| Error::InvariantViolation("sibling order values exhausted".into()))
}

// MenuTree //
//**********//
#[derive(Clone, Debug, Default)]
pub struct MenuTree {
	items: HashMap<ItemId, MenuItem>,
	/// Sibling groups, each sorted by `(order, id)`
	groups: HashMap<GroupKey, Vec<ItemId>>,
}

impl MenuTree {
	/// Builds a tree from a storage snapshot.
	///
	/// Dangling parents and footer items with a parent are rejected. Cycles are
	/// not detected here; traversals report them as `Error::Cycle`.
	pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> AgResult<Self> {
		let mut tree = MenuTree::default();
		for item in items {
			tree.groups.entry(GroupKey::of(&item)).or_default().push(item.id);
			tree.items.insert(item.id, item);
		}
		for item in tree.items.values() {
			let Some(parent) = item.parent else {
				continue;
			};
			if item.menu_type == MenuType::Footer {
				return Err(Rejection::FooterParent.into_error(item.id));
			}
			let Some(parent) = tree.items.get(&parent) else {
				return Err(Error::InvariantViolation(format!(
					"item {} refers to missing parent {}",
					item.id, parent
				)));
			};
			if parent.menu_type != item.menu_type {
				return Err(Rejection::MenuTypeMismatch.into_error(item.id));
			}
		}
		let keys: Vec<GroupKey> = tree.groups.keys().copied().collect();
		for key in keys {
			tree.sort_group(key);
		}
		Ok(tree)
	}

	fn sort_group(&mut self, key: GroupKey) {
		let items = &self.items;
		if let Some(group) = self.groups.get_mut(&key) {
			group.sort_by_key(|id| (items.get(id).map_or(i32::MAX, |item| item.order), *id));
		}
	}

	fn detach(&mut self, key: GroupKey, id: ItemId) {
		if let Some(group) = self.groups.get_mut(&key) {
			group.retain(|member| *member != id);
			if group.is_empty() {
				self.groups.remove(&key);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn get(&self, id: ItemId) -> Option<&MenuItem> {
		self.items.get(&id)
	}

	pub fn item(&self, id: ItemId) -> AgResult<&MenuItem> {
		self.items.get(&id).ok_or(Error::NotFound)
	}

	pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
		self.items.values()
	}

	/// Members of a sibling group in display order.
	pub fn group(&self, key: GroupKey) -> &[ItemId] {
		self.groups.get(&key).map_or(&[], Vec::as_slice)
	}

	pub fn roots(&self, menu_type: MenuType) -> impl Iterator<Item = &MenuItem> {
		self.group(GroupKey { menu_type, parent: None }).iter().filter_map(|id| self.items.get(id))
	}

	pub fn children(&self, id: ItemId) -> impl Iterator<Item = &MenuItem> {
		self.group(GroupKey::main(Some(id))).iter().filter_map(|id| self.items.get(id))
	}

	pub fn has_children(&self, id: ItemId) -> bool {
		!self.group(GroupKey::main(Some(id))).is_empty()
	}

	/// Parent chain of `id`, nearest first, ending at a root item.
	pub fn ancestors(&self, id: ItemId) -> AgResult<Ancestors<'_>> {
		let item = self.item(id)?;
		Ok(Ancestors { tree: self, origin: id, next: item.parent, steps: 0 })
	}

	pub fn find_root(&self, id: ItemId) -> AgResult<ItemId> {
		let mut root = id;
		for ancestor in self.ancestors(id)? {
			root = ancestor?;
		}
		Ok(root)
	}

	pub fn find_root_items(&self, ids: impl IntoIterator<Item = ItemId>) -> AgResult<BTreeSet<ItemId>> {
		ids.into_iter().map(|id| self.find_root(id)).collect()
	}

	/// True if `ancestor` appears on the parent chain of `id`.
	pub fn is_descendant(&self, id: ItemId, ancestor: ItemId) -> AgResult<bool> {
		for candidate in self.ancestors(id)? {
			if candidate? == ancestor {
				return Ok(true);
			}
		}
		Ok(false)
	}

	/// All items below `id`, parents before children.
	pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
		let mut out = Vec::new();
		let mut seen = HashSet::from([id]);
		let mut stack: Vec<ItemId> = self.group(GroupKey::main(Some(id))).iter().rev().copied().collect();
		while let Some(next) = stack.pop() {
			if !seen.insert(next) {
				continue;
			}
			out.push(next);
			stack.extend(self.group(GroupKey::main(Some(next))).iter().rev().copied());
		}
		out
	}

	/// Order value that appends to the end of a group.
	pub fn next_order(&self, key: GroupKey) -> AgResult<i32> {
		match self.group(key).iter().filter_map(|id| self.items.get(id)).map(|item| item.order).max() {
			Some(last) => following_order(last),
			None => Ok(0),
		}
	}

	/// Checks whether an item of `menu_type` may live under `parent`.
	pub fn check_placement(&self, parent: Option<ItemId>, menu_type: MenuType) -> Result<(), Rejection> {
		let Some(parent) = parent else {
			return Ok(());
		};
		if menu_type == MenuType::Footer {
			return Err(Rejection::FooterParent);
		}
		let parent = self.items.get(&parent).ok_or(Rejection::UnknownParent)?;
		if parent.menu_type != menu_type {
			return Err(Rejection::MenuTypeMismatch);
		}
		if parent.has_content() {
			return Err(Rejection::ParentHasContent);
		}
		Ok(())
	}

	pub fn check_move(&self, id: ItemId, new_parent: Option<ItemId>) -> Result<(), Rejection> {
		let item = self.items.get(&id).ok_or(Rejection::UnknownItem)?;
		self.check_placement(new_parent, item.menu_type)?;
		if let Some(parent) = new_parent {
			if parent == id || self.is_descendant(parent, id).map_err(|_| Rejection::WouldCycle)? {
				return Err(Rejection::WouldCycle);
			}
		}
		Ok(())
	}

	/// Moves `id` under `new_parent` at position `order`.
	pub fn move_item(&mut self, id: ItemId, new_parent: Option<ItemId>, order: i32) -> Result<(), Rejection> {
		self.check_move(id, new_parent)?;
		let item = self.items.get_mut(&id).ok_or(Rejection::UnknownItem)?;
		let old_key = GroupKey::of(item);
		item.parent = new_parent;
		item.order = order;
		let new_key = GroupKey::of(item);

		self.detach(old_key, id);
		self.groups.entry(new_key).or_default().push(id);
		self.sort_group(new_key);
		Ok(())
	}

	pub fn set_order(&mut self, id: ItemId, order: i32) -> AgResult<()> {
		let item = self.items.get_mut(&id).ok_or(Error::NotFound)?;
		item.order = order;
		let key = GroupKey::of(item);
		self.sort_group(key);
		Ok(())
	}

	pub fn set_target(&mut self, id: ItemId, target: Option<MenuTarget>) -> Result<(), Rejection> {
		if target.is_some() && self.has_children(id) {
			return Err(Rejection::HasChildren);
		}
		let item = self.items.get_mut(&id).ok_or(Rejection::UnknownItem)?;
		item.target = target;
		Ok(())
	}

	pub fn remove(&mut self, id: ItemId, policy: DeletePolicy) -> AgResult<Removal> {
		let item = self.item(id)?.clone();
		let mut removal = Removal::default();

		match policy {
			DeletePolicy::Cascade => {
				removal.removed = self.descendants(id);
			}
			DeletePolicy::Reparent => {
				let dest = GroupKey::of(&item);
				let mut order = self.next_order(dest)?;
				let children: Vec<ItemId> = self.group(GroupKey::main(Some(id))).to_vec();
				for (n, child) in children.into_iter().enumerate() {
					if n > 0 {
						order = following_order(order)?;
					}
					self.move_item(child, item.parent, order).map_err(|r| r.into_error(child))?;
					removal.moved.push(ItemPosition { id: child, parent: item.parent, order });
				}
			}
		}
		removal.removed.insert(0, id);

		for removed in &removal.removed {
			if let Some(item) = self.items.remove(removed) {
				self.detach(GroupKey::of(&item), *removed);
			}
		}
		self.groups.remove(&GroupKey::main(Some(id)));
		Ok(removal)
	}

	/// Positions that differ from `before`, sorted by id.
	pub fn changed_positions(&self, before: &MenuTree) -> Vec<ItemPosition> {
		let mut changed: Vec<ItemPosition> = self
			.items
			.values()
			.filter(|item| {
				before.get(item.id).is_none_or(|old| old.parent != item.parent || old.order != item.order)
			})
			.map(|item| ItemPosition { id: item.id, parent: item.parent, order: item.order })
			.collect();
		changed.sort_by_key(|pos| pos.id);
		changed
	}
}


// vim: ts=4
