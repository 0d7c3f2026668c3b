//! Shared fixtures for the menu tests
//!
//! Every fixture runs on the in-memory adapters; `build_app` wires them into
//! an `AppState` the same way the server does.

#![allow(dead_code)]

use std::sync::Arc;

use agora_core::extensions::Extensions;
use agora_core::routes::RouteTable;
use agora_core::{App, AppBuilderOpts, AppState};
use agora_menu::memory::{MemoryActorAdapter, MemoryMenuAdapter, MemoryPermissionStore};
use agora_types::actor_adapter::Actor;
use agora_types::menu::{LocalizedText, MenuItem, MenuTarget, MenuType};
use agora_types::perm_store::{Capability, ObjectRef};
use agora_types::types::{DocumentId, ItemId};

pub struct Fixture {
	pub app: App,
	pub menu: Arc<MemoryMenuAdapter>,
	pub perms: Arc<MemoryPermissionStore>,
}

impl Fixture {
	pub fn grant(&self, capability: Capability, group: &str, id: i64) {
		self.perms.grant(capability, group, &ObjectRef::MenuItem(ItemId(id)));
	}

	pub fn grant_menu_admin(&self, group: &str) {
		self.perms.grant(Capability::ChangeChildren, group, &ObjectRef::menu_items());
	}

	pub fn item(&self, id: i64) -> MenuItem {
		self.menu
			.snapshot()
			.into_iter()
			.find(|item| item.id == ItemId(id))
			.unwrap_or_else(|| panic!("item {} is gone", id))
	}

	/// `(id, parent, order)` of every item, by id.
	pub fn positions(&self) -> Vec<(i64, Option<i64>, i32)> {
		self.menu
			.snapshot()
			.into_iter()
			.map(|item| (item.id.0, item.parent.map(|p| p.0), item.order))
			.collect()
	}

	/// Ids of `parent`'s children by ascending order.
	pub fn children(&self, parent: Option<i64>) -> Vec<i64> {
		let mut items: Vec<MenuItem> = self
			.menu
			.snapshot()
			.into_iter()
			.filter(|item| item.parent.map(|p| p.0) == parent && item.menu_type == MenuType::MainMenu)
			.collect();
		items.sort_by_key(|item| (item.order, item.id));
		items.into_iter().map(|item| item.id.0).collect()
	}
}

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub fn item(id: i64, parent: Option<i64>, order: i32) -> MenuItem {
	MenuItem {
		id: ItemId(id),
		title: LocalizedText::new(format!("Item {}", id), format!("Eintrag {}", id)),
		order,
		target: None,
		parent: parent.map(ItemId),
		menu_type: MenuType::MainMenu,
	}
}

pub fn link_item(id: i64, parent: Option<i64>, order: i32, link: &str) -> MenuItem {
	MenuItem { target: Some(MenuTarget::Link(link.into())), ..item(id, parent, order) }
}

pub fn document_item(id: i64, parent: Option<i64>, order: i32, document: i64) -> MenuItem {
	MenuItem { target: Some(MenuTarget::Document(DocumentId(document))), ..item(id, parent, order) }
}

pub fn footer_item(id: i64, order: i32, link: &str) -> MenuItem {
	MenuItem { menu_type: MenuType::Footer, ..link_item(id, None, order, link) }
}

pub fn actor(name: &str, groups: &[&str]) -> Actor {
	Actor {
		id: Some(name.into()),
		groups: groups.iter().map(|g| (*g).into()).collect(),
		is_superuser: false,
		lang: None,
	}
}

pub fn superuser() -> Actor {
	Actor { is_superuser: true, ..actor("root", &[]) }
}

pub fn build_app(items: impl IntoIterator<Item = MenuItem>) -> Fixture {
	setup_test_logging();
	let opts = AppBuilderOpts {
		routes: Box::new([
			("index".into(), "/".into()),
			("polls:index".into(), "/polls/".into()),
			("minutes:list".into(), "/minutes/".into()),
		]),
		..Default::default()
	};
	let menu = Arc::new(MemoryMenuAdapter::with_items(items));
	let perms = Arc::new(MemoryPermissionStore::new());
	perms.add_group(&opts.anonymous_group);
	perms.add_group(&opts.university_group);

	let mut extensions = Extensions::new();
	agora_menu::register(&mut extensions).unwrap();

	let app = Arc::new(AppState {
		content: Arc::new(RouteTable::from_opts(&opts)),
		opts,
		menu_adapter: menu.clone(),
		perm_store: perms.clone(),
		actor_adapter: Arc::new(MemoryActorAdapter::new()),
		extensions,
	});
	Fixture { app, menu, perms }
}

// vim: ts=4
