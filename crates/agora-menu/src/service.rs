//! Menu operations: load, lock, validate, apply, persist.
//!
//! Every write locks the sibling groups it touches, then re-reads the tree
//! under those locks before validating anything.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::lock::{self, GroupGuard, SiblingLocks};
use crate::order::{self, OrderReport};
use crate::perm::{self, Authorizer, GroupPermissions};
use crate::prelude::*;
use crate::proposal::Proposal;
use crate::tree::{DeletePolicy, GroupKey, MenuTree, Rejection};
use crate::visibility::{self, ManageView, NavigationMenu};
use crate::link;
use agora_types::menu::LocalizedText;
use agora_types::menu_adapter::{CreateMenuItem, UpdateMenuItemData};
use agora_types::perm_store::{Capability, ObjectRef};

const MAX_LOCK_ATTEMPTS: usize = 5;

/// Capabilities the owning group receives on a new item.
const OWNER_CAPABILITIES: [Capability; 3] =
	[Capability::View, Capability::Edit, Capability::ChangeChildren];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
	pub title: LocalizedText,
	#[serde(default)]
	pub link: Option<Box<str>>,
	#[serde(default)]
	pub document: Option<DocumentId>,
	#[serde(default)]
	pub parent: Option<ItemId>,
	#[serde(default)]
	pub menu_type: Option<MenuType>,
	/// Appended to the sibling group when missing
	#[serde(default)]
	pub order: Option<i32>,
	/// Group that receives view, edit and change_children on the new item
	#[serde(default)]
	pub group: Option<Box<str>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
	#[serde(default)]
	pub title_en: Patch<Box<str>>,
	#[serde(default)]
	pub title_de: Patch<Box<str>>,
	#[serde(default)]
	pub link: Patch<Box<str>>,
	#[serde(default)]
	pub document: Patch<DocumentId>,
	#[serde(default)]
	pub parent: Patch<ItemId>,
}

fn locks(app: &App) -> AgResult<&SiblingLocks> {
	app.ext::<SiblingLocks>()
}

pub async fn load_tree(app: &App) -> AgResult<MenuTree> {
	MenuTree::from_items(app.menu_adapter.list_menu_items().await?)
}

/// Locks the groups `lock_set` asks for and loads the tree under them.
///
/// The set is recomputed on the fresh tree; if it grew while waiting the
/// locks are dropped and taken again with the larger set.
async fn lock_and_load<F>(app: &App, lock_set: F) -> AgResult<(GroupGuard, MenuTree)>
where
	F: Fn(&MenuTree) -> AgResult<BTreeSet<GroupKey>>,
{
	let locks = locks(app)?;
	let mut keys = lock_set(&load_tree(app).await?)?;
	for attempt in 1..=MAX_LOCK_ATTEMPTS {
		let guard = locks.acquire(keys).await;
		let tree = load_tree(app).await?;
		let needed = lock_set(&tree)?;
		if guard.covers(&needed) {
			return Ok((guard, tree));
		}
		debug!(attempt = attempt, "Lock set grew while waiting, retrying");
		keys = needed.union(guard.keys()).copied().collect();
	}
	error!("Could not lock the affected menu groups");
	Err(Error::Internal("could not lock the affected menu groups".into()))
}

/// Resolves a link/document patch pair against the current target.
/// `None` leaves the target as it is.
fn patched_target(
	current: Option<&MenuTarget>,
	link: &Patch<Box<str>>,
	document: &Patch<DocumentId>,
) -> AgResult<Option<Option<MenuTarget>>> {
	let cleared = Patch::Null;
	let link = match link {
		Patch::Value(l) if l.trim().is_empty() => &cleared,
		other => other,
	};
	Ok(match (link, document) {
		(Patch::Value(_), Patch::Value(_)) => {
			return Err(Error::ValidationError(
				"only one of document and link may be defined".into(),
			));
		}
		(Patch::Value(l), _) => Some(Some(MenuTarget::Link(l.trim().into()))),
		(_, Patch::Value(d)) => Some(Some(MenuTarget::Document(*d))),
		(Patch::Null, Patch::Null) => Some(None),
		(Patch::Null, Patch::Undefined) => {
			current.and_then(MenuTarget::link).map(|_| None)
		}
		(Patch::Undefined, Patch::Null) => {
			current.and_then(MenuTarget::document).map(|_| None)
		}
		(Patch::Undefined, Patch::Undefined) => None,
	})
}

// Reads //
//*******//
pub async fn navigation(app: &App, viewer: &Actor) -> AgResult<NavigationMenu> {
	let tree = load_tree(app).await?;
	visibility::navigation_menu(&tree, viewer, Authorizer::new(app.perm_store.as_ref()), app.content.as_ref())
		.await
}

pub async fn manage(app: &App, viewer: &Actor) -> AgResult<ManageView> {
	let tree = load_tree(app).await?;
	visibility::manage_view(&tree, viewer, Authorizer::new(app.perm_store.as_ref())).await
}

// Reorder //
//*********//
pub async fn apply_order(app: &App, actor: &Actor, proposal: &Proposal) -> AgResult<OrderReport> {
	let (_guard, mut tree) = lock_and_load(app, |tree| {
		proposal.validate(tree)?;
		lock::order_lock_set(tree, proposal)
	})
	.await?;

	let before = tree.clone();
	let report =
		order::apply_order(&mut tree, proposal, actor, Authorizer::new(app.perm_store.as_ref()))
			.await?;

	let positions = tree.changed_positions(&before);
	if !positions.is_empty() {
		app.menu_adapter.update_positions(&positions).await?;
	}
	debug!(positions = positions.len(), "Persisted menu positions");
	Ok(report)
}

// Item lifecycle //
//****************//
pub async fn create_item(app: &App, actor: &Actor, req: CreateMenuItemRequest) -> AgResult<MenuItem> {
	let auth = Authorizer::new(app.perm_store.as_ref());
	let menu_type = req.menu_type.unwrap_or(MenuType::MainMenu);
	let target = MenuTarget::from_parts(req.link.as_deref(), req.document)?;
	if req.title.en.trim().is_empty() {
		return Err(Error::ValidationError("title_en is required".into()));
	}

	let is_admin = auth.is_menu_admin(actor).await?;
	let allowed = if menu_type == MenuType::Footer { is_admin } else { auth.may_rearrange(actor, req.parent).await? };
	if !allowed {
		warn!(subject = %actor.subject(), parent = ?req.parent, "Menu item creation denied");
		return Err(Error::PermissionDenied);
	}
	if let Some(MenuTarget::Link(link)) = &target {
		if !is_admin {
			warn!(subject = %actor.subject(), "Only menu administrators may set links");
			return Err(Error::PermissionDenied);
		}
		link::validate_link(link, app.content.as_ref())?;
	}
	if let Some(group) = &req.group {
		if !is_admin && !actor.in_group(group) {
			return Err(Error::ValidationError(format!("unknown group {:?}", group)));
		}
	}

	let key = GroupKey { menu_type, parent: req.parent };
	let (_guard, tree) = lock_and_load(app, |_| Ok(BTreeSet::from([key]))).await?;
	tree.check_placement(req.parent, menu_type).map_err(|r| match r {
		Rejection::UnknownParent => Error::ValidationError("parent does not exist".into()),
		Rejection::FooterParent => Error::InvariantViolation("footer items cannot have a parent".into()),
		Rejection::MenuTypeMismatch => {
			Error::InvariantViolation("items must be in the same menu as their parent".into())
		}
		_ => Error::InvariantViolation("parent has a link or document and cannot have children".into()),
	})?;

	let new_item = CreateMenuItem {
		title: req.title,
		target,
		parent: req.parent,
		menu_type,
		order: match req.order {
			Some(order) => order,
			None => tree.next_order(key)?,
		},
	};
	let id = app.menu_adapter.create_menu_item(&new_item).await?;

	if let Some(group) = &req.group {
		let requested: BTreeSet<Capability> = OWNER_CAPABILITIES.into_iter().collect();
		perm::save_group_permissions(
			app.perm_store.as_ref(),
			&app.opts,
			group,
			&ObjectRef::MenuItem(id),
			&requested,
		)
		.await?;
	}
	info!(subject = %actor.subject(), item = %id, parent = ?req.parent, "Created menu item");
	app.menu_adapter.read_menu_item(id).await
}

pub async fn update_item(
	app: &App,
	actor: &Actor,
	id: ItemId,
	req: UpdateMenuItemRequest,
) -> AgResult<MenuItem> {
	let auth = Authorizer::new(app.perm_store.as_ref());
	let new_parent = req.parent.as_change().map(|p| p.copied());

	let (_guard, mut tree) = lock_and_load(app, |tree| {
		let item = tree.item(id)?;
		let mut keys = match new_parent {
			Some(parent) => lock::move_lock_set(tree, id, parent)?,
			None => BTreeSet::from([GroupKey::of(item)]),
		};
		keys.insert(GroupKey::main(Some(id)));
		Ok(keys)
	})
	.await?;
	let item = tree.item(id)?.clone();

	let can_edit = auth.can(actor, Capability::Edit, &ObjectRef::MenuItem(id)).await?
		|| auth.may_rearrange(actor, item.parent).await?;
	if !can_edit {
		warn!(subject = %actor.subject(), item = %id, "Menu item edit denied");
		return Err(Error::PermissionDenied);
	}

	let mut data = UpdateMenuItemData {
		title_en: req.title_en.clone(),
		title_de: req.title_de.clone(),
		..Default::default()
	};
	if matches!(&req.title_en, Patch::Null) || req.title_en.value().is_some_and(|t| t.trim().is_empty()) {
		return Err(Error::ValidationError("title_en is required".into()));
	}

	if let Some(target) = patched_target(item.target.as_ref(), &req.link, &req.document)? {
		if let Some(MenuTarget::Link(link)) = &target {
			if item.target.as_ref().and_then(MenuTarget::link) != Some(&**link) {
				if !auth.is_menu_admin(actor).await? {
					warn!(subject = %actor.subject(), item = %id, "Only menu administrators may set links");
					return Err(Error::PermissionDenied);
				}
				link::validate_link(link, app.content.as_ref())?;
			}
		}
		tree.set_target(id, target.clone()).map_err(|r| r.into_error(id))?;
		data.target = match target {
			Some(target) => Patch::Value(target),
			None => Patch::Null,
		};
	}

	if let Some(parent) = new_parent {
		if parent != item.parent {
			if !auth.may_rearrange(actor, parent).await? || !auth.may_rearrange(actor, item.parent).await? {
				warn!(subject = %actor.subject(), item = %id, parent = ?parent, "Menu item move denied");
				return Err(Error::PermissionDenied);
			}
			let order = tree.next_order(GroupKey { menu_type: item.menu_type, parent })?;
			tree.move_item(id, parent, order).map_err(|r| r.into_error(id))?;
			data.parent = parent.map_or(Patch::Null, Patch::Value);
			data.order = Some(order);
		}
	}

	app.menu_adapter.update_menu_item(id, &data).await?;
	info!(subject = %actor.subject(), item = %id, "Updated menu item");
	app.menu_adapter.read_menu_item(id).await
}

pub async fn delete_item(
	app: &App,
	actor: &Actor,
	id: ItemId,
	policy: DeletePolicy,
) -> AgResult<Vec<ItemId>> {
	let auth = Authorizer::new(app.perm_store.as_ref());
	let (_guard, mut tree) = lock_and_load(app, |tree| {
		let item = tree.item(id)?;
		let mut keys = BTreeSet::from([GroupKey::of(item), GroupKey::main(Some(id))]);
		if policy == DeletePolicy::Cascade {
			keys.extend(tree.descendants(id).into_iter().map(|d| GroupKey::main(Some(d))));
		}
		Ok(keys)
	})
	.await?;
	let item = tree.item(id)?.clone();

	let allowed = auth.can(actor, Capability::Delete, &ObjectRef::MenuItem(id)).await?
		|| auth.may_rearrange(actor, item.parent).await?;
	if !allowed {
		warn!(subject = %actor.subject(), item = %id, "Menu item deletion denied");
		return Err(Error::PermissionDenied);
	}

	let removal = tree.remove(id, policy)?;
	app.menu_adapter.delete_menu_items(&removal.removed, &removal.moved).await?;
	info!(
		subject = %actor.subject(),
		item = %id,
		removed = removal.removed.len(),
		policy = ?policy,
		"Deleted menu item"
	);
	Ok(removal.removed)
}

// Permissions //
//*************//
async fn require_menu_admin(app: &App, actor: &Actor) -> AgResult<()> {
	if Authorizer::new(app.perm_store.as_ref()).is_menu_admin(actor).await? {
		Ok(())
	} else {
		warn!(subject = %actor.subject(), "Menu administration required");
		Err(Error::PermissionDenied)
	}
}

pub async fn item_permissions(app: &App, actor: &Actor, id: ItemId) -> AgResult<Vec<GroupPermissions>> {
	require_menu_admin(app, actor).await?;
	app.menu_adapter.read_menu_item(id).await?;
	perm::group_permissions(app.perm_store.as_ref(), &app.opts, &ObjectRef::MenuItem(id)).await
}

pub async fn save_item_permissions(
	app: &App,
	actor: &Actor,
	id: ItemId,
	rows: &[GroupPermissions],
) -> AgResult<Vec<GroupPermissions>> {
	require_menu_admin(app, actor).await?;
	app.menu_adapter.read_menu_item(id).await?;
	let object = ObjectRef::MenuItem(id);
	for row in rows {
		perm::save_group_permissions(app.perm_store.as_ref(), &app.opts, &row.group, &object, &row.capabilities)
			.await?;
	}
	perm::group_permissions(app.perm_store.as_ref(), &app.opts, &object).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_patched_target() {
		let link = MenuTarget::Link("index".into());
		let doc = MenuTarget::Document(DocumentId(3));

		let res = patched_target(Some(&link), &Patch::Undefined, &Patch::Undefined).unwrap();
		assert_eq!(res, None);

		let res = patched_target(Some(&link), &Patch::Undefined, &Patch::Value(DocumentId(3))).unwrap();
		assert_eq!(res, Some(Some(doc.clone())));

		// Clearing the document leaves a link alone
		let res = patched_target(Some(&link), &Patch::Undefined, &Patch::Null).unwrap();
		assert_eq!(res, None);
		let res = patched_target(Some(&doc), &Patch::Undefined, &Patch::Null).unwrap();
		assert_eq!(res, Some(None));

		let res = patched_target(None, &Patch::Value("  ".into()), &Patch::Undefined).unwrap();
		assert_eq!(res, None);

		let res = patched_target(None, &Patch::Value("index".into()), &Patch::Value(DocumentId(1)));
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}
}

// vim: ts=4
