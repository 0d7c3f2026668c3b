//! Capability checks and per-group permission editing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prelude::*;
use agora_core::AppBuilderOpts;
use agora_types::perm_store::{Capability, ObjectRef, PermissionStore};

/// Capability checks on top of a permission store. Superusers pass every check,
/// and a grant on the menu item content type covers every single item.
#[derive(Clone, Copy)]
pub struct Authorizer<'a> {
	store: &'a dyn PermissionStore,
}

impl<'a> Authorizer<'a> {
	pub fn new(store: &'a dyn PermissionStore) -> Self {
		Self { store }
	}

	pub async fn can(&self, actor: &Actor, capability: Capability, object: &ObjectRef) -> AgResult<bool> {
		if actor.is_superuser {
			return Ok(true);
		}
		if self.store.has_capability(actor, capability, object).await? {
			return Ok(true);
		}
		match object {
			ObjectRef::MenuItem(_) => {
				self.store.has_capability(actor, capability, &ObjectRef::menu_items()).await
			}
			_ => Ok(false),
		}
	}

	/// Global menu administration: `ChangeChildren` on the menu item content type.
	pub async fn is_menu_admin(&self, actor: &Actor) -> AgResult<bool> {
		self.can(actor, Capability::ChangeChildren, &ObjectRef::menu_items()).await
	}

	/// May the actor rearrange the children of `parent` (the root level for `None`)?
	pub async fn may_rearrange(&self, actor: &Actor, parent: Option<ItemId>) -> AgResult<bool> {
		self.can(actor, Capability::ChangeChildren, &ObjectRef::group_parent(parent)).await
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPermissions {
	pub group: Box<str>,
	pub capabilities: BTreeSet<Capability>,
	/// Restricted groups can only ever hold `view`
	#[serde(default)]
	pub restricted: bool,
}

/// Replaces the capabilities `group` holds on `object` with `requested`.
///
/// Non-view capabilities require view. Restricted groups silently keep at most
/// view. Returns the capabilities actually held afterwards.
pub async fn save_group_permissions(
	store: &dyn PermissionStore,
	opts: &AppBuilderOpts,
	group: &str,
	object: &ObjectRef,
	requested: &BTreeSet<Capability>,
) -> AgResult<BTreeSet<Capability>> {
	if !requested.contains(&Capability::View) && !requested.is_empty() {
		return Err(Error::ValidationError(
			"If you want to enable additional permissions for a group you also need to enable the view permission for that group!"
				.into(),
		));
	}

	let mut effective = requested.clone();
	if opts.is_restricted_group(group) {
		effective.retain(|cap| *cap == Capability::View);
	}

	let current = store.capabilities_for(group, object).await?;
	for cap in Capability::ALL {
		match (effective.contains(&cap), current.contains(&cap)) {
			(true, false) => store.assign(cap, group, object).await?,
			(false, true) => store.revoke(cap, group, object).await?,
			_ => {}
		}
	}
	info!(group = %group, object = %object, capabilities = ?effective, "Saved group permissions");
	Ok(effective)
}

/// The capability matrix of every known group on `object`.
pub async fn group_permissions(
	store: &dyn PermissionStore,
	opts: &AppBuilderOpts,
	object: &ObjectRef,
) -> AgResult<Vec<GroupPermissions>> {
	let mut matrix = Vec::new();
	for group in store.list_groups().await? {
		let capabilities = store.capabilities_for(&group, object).await?;
		let restricted = opts.is_restricted_group(&group);
		matrix.push(GroupPermissions { group, capabilities, restricted });
	}
	Ok(matrix)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryPermissionStore;

	fn caps(list: &[Capability]) -> BTreeSet<Capability> {
		list.iter().copied().collect()
	}

	#[tokio::test]
	async fn test_non_view_requires_view() {
		let store = MemoryPermissionStore::new();
		let opts = AppBuilderOpts::default();
		let obj = ObjectRef::MenuItem(ItemId(1));

		let res = save_group_permissions(&store, &opts, "staff", &obj, &caps(&[Capability::Edit])).await;
		assert!(matches!(res, Err(Error::ValidationError(_))));
		assert!(store.capabilities_for("staff", &obj).await.unwrap().is_empty());

		let saved = save_group_permissions(
			&store,
			&opts,
			"staff",
			&obj,
			&caps(&[Capability::View, Capability::Edit]),
		)
		.await
		.unwrap();
		assert_eq!(saved, caps(&[Capability::View, Capability::Edit]));

		let saved = save_group_permissions(&store, &opts, "staff", &obj, &caps(&[])).await.unwrap();
		assert!(saved.is_empty());
		assert!(store.capabilities_for("staff", &obj).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_restricted_groups_only_get_view() {
		let store = MemoryPermissionStore::new();
		let opts = AppBuilderOpts::default();
		let obj = ObjectRef::MenuItem(ItemId(1));
		let all = caps(&Capability::ALL);

		for group in ["Anonymous", "University Network"] {
			let saved = save_group_permissions(&store, &opts, group, &obj, &all).await.unwrap();
			assert_eq!(saved, caps(&[Capability::View]));
			assert_eq!(store.capabilities_for(group, &obj).await.unwrap(), caps(&[Capability::View]));
		}

		let matrix = group_permissions(&store, &opts, &obj).await.unwrap();
		assert!(matrix.iter().all(|row| row.restricted));
	}

	#[tokio::test]
	async fn test_content_type_grant_covers_items() {
		let store = MemoryPermissionStore::new();
		store.grant(Capability::ChangeChildren, "admins", &ObjectRef::menu_items());
		store.grant(Capability::View, "staff", &ObjectRef::MenuItem(ItemId(7)));
		let auth = Authorizer::new(&store);
		let admin = Actor { id: Some("ada".into()), groups: Box::new(["admins".into()]), is_superuser: false, lang: None };
		let staff = Actor { id: Some("sam".into()), groups: Box::new(["staff".into()]), is_superuser: false, lang: None };

		assert!(auth.is_menu_admin(&admin).await.unwrap());
		assert!(auth.may_rearrange(&admin, Some(ItemId(7))).await.unwrap());
		assert!(!auth.can(&admin, Capability::Edit, &ObjectRef::MenuItem(ItemId(7))).await.unwrap());

		assert!(auth.can(&staff, Capability::View, &ObjectRef::MenuItem(ItemId(7))).await.unwrap());
		assert!(!auth.can(&staff, Capability::View, &ObjectRef::MenuItem(ItemId(8))).await.unwrap());
		assert!(!auth.is_menu_admin(&staff).await.unwrap());
	}
}

// vim: ts=4
