//! Per-viewer views of the menu tree.
//!
//! Navigation shows what a viewer may see; the management view shows what a
//! viewer may rearrange or edit. Both keep the path from a root down to every
//! included item.

use serde::Serialize;
use std::collections::HashMap;

use crate::perm::Authorizer;
use crate::prelude::*;
use crate::tree::MenuTree;
use agora_types::content::ContentResolver;
use agora_types::menu::LocalizedText;
use agora_types::perm_store::{Capability, ObjectRef};

#[derive(Clone, Copy, Debug, Default)]
struct ItemCaps {
	view: bool,
	edit: bool,
	change_children: bool,
}

/// Capabilities of one viewer on every item of a tree.
struct CapsTable {
	caps: HashMap<ItemId, ItemCaps>,
	is_admin: bool,
}

impl CapsTable {
	async fn load(tree: &MenuTree, viewer: &Actor, auth: Authorizer<'_>) -> AgResult<Self> {
		let is_admin = auth.is_menu_admin(viewer).await?;
		let mut caps = HashMap::with_capacity(tree.len());
		for item in tree.items() {
			let object = ObjectRef::MenuItem(item.id);
			caps.insert(
				item.id,
				ItemCaps {
					view: auth.can(viewer, Capability::View, &object).await?,
					edit: auth.can(viewer, Capability::Edit, &object).await?,
					change_children: auth.can(viewer, Capability::ChangeChildren, &object).await?,
				},
			);
		}
		Ok(Self { caps, is_admin })
	}

	fn get(&self, id: ItemId) -> ItemCaps {
		self.caps.get(&id).copied().unwrap_or_default()
	}

	/// `ChangeChildren` on the item's parent, menu administration for roots.
	fn manages_slot(&self, item: &MenuItem) -> bool {
		match item.parent {
			Some(parent) => self.get(parent).change_children,
			None => self.is_admin,
		}
	}

	fn can_edit(&self, item: &MenuItem) -> bool {
		self.get(item.id).edit || self.manages_slot(item)
	}
}

// Navigation //
//************//
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
	pub id: ItemId,
	pub title: Box<str>,
	/// Only present when the viewer holds `view` on the item
	pub url: Option<Box<str>>,
	pub can_edit: bool,
	pub can_change_children: bool,
	pub children: Vec<MenuEntry>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationMenu {
	pub main_menu_items: Vec<MenuEntry>,
	pub footer_items: Vec<MenuEntry>,
}

struct NavigationBuilder<'a> {
	tree: &'a MenuTree,
	caps: CapsTable,
	urls: HashMap<ItemId, Box<str>>,
	lang: &'a str,
}

impl NavigationBuilder<'_> {
	fn build(&self, item: &MenuItem) -> Option<MenuEntry> {
		let children: Vec<MenuEntry> =
			self.tree.children(item.id).filter_map(|child| self.build(child)).collect();
		let caps = self.caps.get(item.id);
		let visible = caps.view || !children.is_empty() || (item.is_root() && item.has_content());
		if !visible {
			return None;
		}
		Some(MenuEntry {
			id: item.id,
			title: item.title.get(self.lang).into(),
			url: if caps.view { self.urls.get(&item.id).cloned() } else { None },
			can_edit: self.caps.can_edit(item),
			can_change_children: caps.change_children,
			children,
		})
	}
}

/// The menu as `viewer` may see it.
///
/// An item is listed when the viewer may view it, when something below it is
/// listed, or when it is a root with a target of its own. Its URL is only
/// given out together with `view`.
pub async fn navigation_menu(
	tree: &MenuTree,
	viewer: &Actor,
	auth: Authorizer<'_>,
	content: &dyn ContentResolver,
) -> AgResult<NavigationMenu> {
	let caps = CapsTable::load(tree, viewer, auth).await?;

	let mut urls = HashMap::new();
	for item in tree.items() {
		if !caps.get(item.id).view {
			continue;
		}
		let url = match &item.target {
			Some(MenuTarget::Link(link)) => content.route_url(link),
			Some(MenuTarget::Document(doc)) => content.document_url(*doc).await?,
			None => None,
		};
		if let Some(url) = url {
			urls.insert(item.id, url);
		}
	}

	let builder = NavigationBuilder { tree, caps, urls, lang: viewer.lang.as_deref().unwrap_or("en") };
	Ok(NavigationMenu {
		main_menu_items: tree
			.roots(MenuType::MainMenu)
			.filter_map(|item| builder.build(item))
			.collect(),
		footer_items: tree.roots(MenuType::Footer).filter_map(|item| builder.build(item)).collect(),
	})
}

// Management //
//************//
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageEntry {
	pub id: ItemId,
	pub title: LocalizedText,
	/// Only present for items the viewer may edit
	pub target: Option<MenuTarget>,
	pub can_edit: bool,
	pub can_change_children: bool,
	pub children: Vec<ManageEntry>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageView {
	pub main_menu_items: Vec<ManageEntry>,
	pub footer_items: Vec<ManageEntry>,
}

fn manage_entry(tree: &MenuTree, caps: &CapsTable, item: &MenuItem) -> Option<ManageEntry> {
	let children: Vec<ManageEntry> =
		tree.children(item.id).filter_map(|child| manage_entry(tree, caps, child)).collect();
	let own = caps.get(item.id);
	let manageable = caps.is_admin || caps.manages_slot(item) || own.change_children;
	if !manageable && children.is_empty() {
		return None;
	}
	let can_edit = caps.can_edit(item);
	Some(ManageEntry {
		id: item.id,
		title: item.title.clone(),
		target: if can_edit { item.target.clone() } else { None },
		can_edit,
		can_change_children: own.change_children,
		children,
	})
}

/// The drag/drop view: everything `viewer` may rearrange, with the path to it.
pub async fn manage_view(tree: &MenuTree, viewer: &Actor, auth: Authorizer<'_>) -> AgResult<ManageView> {
	let caps = CapsTable::load(tree, viewer, auth).await?;

	let main_menu_items: Vec<ManageEntry> = tree
		.roots(MenuType::MainMenu)
		.filter_map(|item| manage_entry(tree, &caps, item))
		.collect();
	let footer_items: Vec<ManageEntry> = if caps.is_admin {
		tree.roots(MenuType::Footer).filter_map(|item| manage_entry(tree, &caps, item)).collect()
	} else {
		Vec::new()
	};

	if !caps.is_admin && main_menu_items.is_empty() {
		warn!(subject = %viewer.subject(), "Nothing in the menu is manageable");
		return Err(Error::PermissionDenied);
	}
	Ok(ManageView { main_menu_items, footer_items })
}

// vim: ts=4
