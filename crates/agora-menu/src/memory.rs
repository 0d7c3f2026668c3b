//! In-memory adapters.
//!
//! Used by tests and by embedders that do not need persistence.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::prelude::*;
use agora_types::actor_adapter::ActorAdapter;
use agora_types::menu_adapter::{CreateMenuItem, ItemPosition, MenuAdapter, UpdateMenuItemData};
use agora_types::perm_store::{Capability, ObjectRef, PermissionStore};

// MemoryPermissionStore //
//***********************//
type Grant = (Box<str>, ObjectRef, Capability);

#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
	grants: Mutex<BTreeSet<Grant>>,
	groups: Mutex<BTreeSet<Box<str>>>,
}

impl MemoryPermissionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_group(&self, group: &str) {
		self.groups.lock().insert(group.into());
	}

	/// Synchronous `assign` for test setup.
	pub fn grant(&self, capability: Capability, group: &str, object: &ObjectRef) {
		self.add_group(group);
		self.grants.lock().insert((group.into(), object.clone(), capability));
	}
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
	async fn has_capability(
		&self,
		actor: &Actor,
		capability: Capability,
		object: &ObjectRef,
	) -> AgResult<bool> {
		let grants = self.grants.lock();
		Ok(actor
			.groups
			.iter()
			.any(|group| grants.contains(&(group.clone(), object.clone(), capability))))
	}

	async fn assign(&self, capability: Capability, group: &str, object: &ObjectRef) -> AgResult<()> {
		self.grant(capability, group, object);
		Ok(())
	}

	async fn revoke(&self, capability: Capability, group: &str, object: &ObjectRef) -> AgResult<()> {
		self.grants.lock().remove(&(group.into(), object.clone(), capability));
		Ok(())
	}

	async fn capabilities_for(
		&self,
		group: &str,
		object: &ObjectRef,
	) -> AgResult<BTreeSet<Capability>> {
		Ok(self
			.grants
			.lock()
			.iter()
			.filter(|(g, o, _)| g.as_ref() == group && o == object)
			.map(|(_, _, cap)| *cap)
			.collect())
	}

	async fn list_groups(&self) -> AgResult<Vec<Box<str>>> {
		Ok(self.groups.lock().iter().cloned().collect())
	}
}

// MemoryMenuAdapter //
//*******************//
#[derive(Debug)]
pub struct MemoryMenuAdapter {
	items: Mutex<BTreeMap<ItemId, MenuItem>>,
	next_id: AtomicI64,
}

impl Default for MemoryMenuAdapter {
	fn default() -> Self {
		Self { items: Mutex::new(BTreeMap::new()), next_id: AtomicI64::new(1) }
	}
}

impl MemoryMenuAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Preloaded with `items`; new ids continue after the largest one.
	pub fn with_items(items: impl IntoIterator<Item = MenuItem>) -> Self {
		let items: BTreeMap<ItemId, MenuItem> = items.into_iter().map(|item| (item.id, item)).collect();
		let next = items.keys().next_back().map_or(1, |id| id.0 + 1);
		Self { items: Mutex::new(items), next_id: AtomicI64::new(next) }
	}

	pub fn snapshot(&self) -> Vec<MenuItem> {
		self.items.lock().values().cloned().collect()
	}
}

#[async_trait]
impl MenuAdapter for MemoryMenuAdapter {
	async fn list_menu_items(&self) -> AgResult<Vec<MenuItem>> {
		Ok(self.snapshot())
	}

	async fn read_menu_item(&self, id: ItemId) -> AgResult<MenuItem> {
		self.items.lock().get(&id).cloned().ok_or(Error::NotFound)
	}

	async fn create_menu_item(&self, item: &CreateMenuItem) -> AgResult<ItemId> {
		let id = ItemId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.items.lock().insert(
			id,
			MenuItem {
				id,
				title: item.title.clone(),
				order: item.order,
				target: item.target.clone(),
				parent: item.parent,
				menu_type: item.menu_type,
			},
		);
		Ok(id)
	}

	async fn update_menu_item(&self, id: ItemId, data: &UpdateMenuItemData) -> AgResult<()> {
		let mut items = self.items.lock();
		let item = items.get_mut(&id).ok_or(Error::NotFound)?;
		match &data.title_en {
			Patch::Undefined => {}
			Patch::Null => return Err(Error::ValidationError("title_en is required".into())),
			Patch::Value(title) => item.title.en = title.clone(),
		}
		if let Some(title) = data.title_de.as_change() {
			item.title.de = title.cloned().unwrap_or_default();
		}
		if let Some(target) = data.target.as_change() {
			item.target = target.cloned();
		}
		if let Some(parent) = data.parent.as_change() {
			item.parent = parent.copied();
		}
		if let Some(order) = data.order {
			item.order = order;
		}
		Ok(())
	}

	async fn update_positions(&self, positions: &[ItemPosition]) -> AgResult<()> {
		let mut items = self.items.lock();
		if positions.iter().any(|pos| !items.contains_key(&pos.id)) {
			return Err(Error::NotFound);
		}
		for pos in positions {
			if let Some(item) = items.get_mut(&pos.id) {
				item.parent = pos.parent;
				item.order = pos.order;
			}
		}
		Ok(())
	}

	async fn delete_menu_items(&self, ids: &[ItemId], positions: &[ItemPosition]) -> AgResult<()> {
		let mut items = self.items.lock();
		for pos in positions {
			if let Some(item) = items.get_mut(&pos.id) {
				item.parent = pos.parent;
				item.order = pos.order;
			}
		}
		for id in ids {
			items.remove(id);
		}
		Ok(())
	}
}

// MemoryActorAdapter //
//********************//
#[derive(Debug, Default)]
pub struct MemoryActorAdapter {
	actors: Mutex<HashMap<Box<str>, Actor>>,
}

impl MemoryActorAdapter {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ActorAdapter for MemoryActorAdapter {
	async fn read_actor(&self, user_id: &str) -> AgResult<Actor> {
		self.actors.lock().get(user_id).cloned().ok_or(Error::NotFound)
	}

	async fn create_user(&self, user_id: &str, is_superuser: bool) -> AgResult<()> {
		self.actors.lock().insert(
			user_id.into(),
			Actor { id: Some(user_id.into()), groups: Box::new([]), is_superuser, lang: None },
		);
		Ok(())
	}

	async fn add_user_to_group(&self, user_id: &str, group: &str) -> AgResult<()> {
		let mut actors = self.actors.lock();
		let actor = actors.get_mut(user_id).ok_or(Error::NotFound)?;
		if !actor.in_group(group) {
			let mut groups = actor.groups.to_vec();
			groups.push(group.into());
			actor.groups = groups.into_boxed_slice();
		}
		Ok(())
	}
}

// vim: ts=4
