//! Menu item lifecycle tests: create, update, delete, permissions

mod common;

use std::collections::BTreeSet;

use agora_menu::perm::GroupPermissions;
use agora_menu::service::{self, CreateMenuItemRequest, UpdateMenuItemRequest};
use agora_menu::tree::DeletePolicy;
use agora_types::error::Error;
use agora_types::menu::MenuTarget;
use agora_types::perm_store::{Capability, ObjectRef, PermissionStore};
use agora_types::types::{DocumentId, ItemId};
use common::*;

fn create_req(json: serde_json::Value) -> CreateMenuItemRequest {
	serde_json::from_value(json).expect("valid create request")
}

fn update_req(json: serde_json::Value) -> UpdateMenuItemRequest {
	serde_json::from_value(json).expect("valid update request")
}

/// 1 ── 2 ── 3
///      └─── 4 (document 7)
/// 5 (link "index")
fn fixture() -> Fixture {
	build_app([
		item(1, None, 0),
		item(2, Some(1), 0),
		item(3, Some(2), 0),
		document_item(4, Some(2), 1, 7),
		link_item(5, None, 1, "index"),
	])
}

// Create //
//********//
#[tokio::test]
async fn test_create_below_managed_item_grants_group() {
	let fx = fixture();
	fx.grant(Capability::ChangeChildren, "editors", 2);
	let editor = actor("eva", &["editors"]);

	let created = service::create_item(
		&fx.app,
		&editor,
		create_req(serde_json::json!({
			"title": { "en": "Minutes", "de": "Protokolle" },
			"document": 12,
			"parent": 2,
			"group": "editors"
		})),
	)
	.await
	.unwrap();

	assert_eq!(created.parent, Some(ItemId(2)));
	assert_eq!(created.order, 2);
	assert_eq!(created.target, Some(MenuTarget::Document(DocumentId(12))));
	assert_eq!(fx.children(Some(2)), vec![3, 4, created.id.0]);

	let caps = fx.perms.capabilities_for("editors", &ObjectRef::MenuItem(created.id)).await.unwrap();
	assert_eq!(caps, BTreeSet::from([Capability::View, Capability::Edit, Capability::ChangeChildren]));
}

#[tokio::test]
async fn test_create_rejections() {
	let fx = fixture();
	fx.grant(Capability::ChangeChildren, "editors", 2);
	let editor = actor("eva", &["editors"]);

	// Root level needs menu administration
	let res = service::create_item(&fx.app, &editor, create_req(serde_json::json!({ "title": { "en": "Top" } }))).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	// Links are for menu administrators only
	let res = service::create_item(
		&fx.app,
		&editor,
		create_req(serde_json::json!({ "title": { "en": "Polls" }, "link": "polls:index", "parent": 2 })),
	)
	.await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	let res = service::create_item(
		&fx.app,
		&editor,
		create_req(serde_json::json!({ "title": { "en": "Other" }, "parent": 2, "group": "strangers" })),
	)
	.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = service::create_item(
		&fx.app,
		&editor,
		create_req(serde_json::json!({ "title": { "en": "Both" }, "parent": 2, "link": "index", "document": 3 })),
	)
	.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	assert_eq!(fx.menu.snapshot().len(), 5);
}

#[tokio::test]
async fn test_create_links_as_superuser() {
	let fx = fixture();
	let admin = superuser();

	let res = service::create_item(
		&fx.app,
		&admin,
		create_req(serde_json::json!({ "title": { "en": "Nowhere" }, "link": "nothing:here" })),
	)
	.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	// A parent with a link takes no children
	let res = service::create_item(
		&fx.app,
		&admin,
		create_req(serde_json::json!({ "title": { "en": "Child" }, "parent": 5 })),
	)
	.await;
	assert!(matches!(res, Err(Error::InvariantViolation(_))));

	let created = service::create_item(
		&fx.app,
		&admin,
		create_req(serde_json::json!({ "title": { "en": "Group minutes" }, "link": "minutes:list?groupid=3" })),
	)
	.await
	.unwrap();
	assert_eq!(created.parent, None);
	assert_eq!(created.order, 2);

	let menu = service::navigation(&fx.app, &admin).await.unwrap();
	let entry = menu.main_menu_items.iter().find(|e| e.id == created.id).unwrap();
	assert_eq!(entry.url.as_deref(), Some("/minutes/?groupid=3"));
}

// Update //
//********//
#[tokio::test]
async fn test_update_title_with_edit_permission() {
	let fx = fixture();
	fx.grant(Capability::Edit, "staff", 3);
	let staff = actor("sam", &["staff"]);

	let updated =
		service::update_item(&fx.app, &staff, ItemId(3), update_req(serde_json::json!({ "titleDe": "Neu" })))
			.await
			.unwrap();
	assert_eq!(updated.title.de.as_ref(), "Neu");
	assert_eq!(updated.title.en.as_ref(), "Item 3");

	// Editing is not rearranging
	let res =
		service::update_item(&fx.app, &staff, ItemId(3), update_req(serde_json::json!({ "parent": 1 }))).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));
	assert_eq!(fx.item(3).parent, Some(ItemId(2)));

	let res = service::update_item(&fx.app, &staff, ItemId(4), update_req(serde_json::json!({ "titleEn": "x" }))).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));
}

#[tokio::test]
async fn test_update_rejects_structural_violations() {
	let fx = fixture();
	let admin = superuser();

	let res = service::update_item(&fx.app, &admin, ItemId(1), update_req(serde_json::json!({ "parent": 3 }))).await;
	assert!(matches!(res, Err(Error::InvariantViolation(_))));

	let res =
		service::update_item(&fx.app, &admin, ItemId(2), update_req(serde_json::json!({ "link": "index" }))).await;
	assert!(matches!(res, Err(Error::InvariantViolation(_))));

	let res = service::update_item(&fx.app, &admin, ItemId(3), update_req(serde_json::json!({ "parent": 5 }))).await;
	assert!(matches!(res, Err(Error::InvariantViolation(_))));

	let res = service::update_item(&fx.app, &admin, ItemId(3), update_req(serde_json::json!({ "titleEn": null }))).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = service::update_item(&fx.app, &admin, ItemId(42), update_req(serde_json::json!({ "titleEn": "x" }))).await;
	assert!(matches!(res, Err(Error::NotFound)));

	assert_eq!(fx.item(1).parent, None);
	assert_eq!(fx.item(2).target, None);
}

#[tokio::test]
async fn test_update_moves_and_retargets() {
	let fx = fixture();
	let admin = superuser();

	// Moving appends to the new sibling group
	let moved = service::update_item(&fx.app, &admin, ItemId(3), update_req(serde_json::json!({ "parent": null })))
		.await
		.unwrap();
	assert_eq!(moved.parent, None);
	assert_eq!(fx.children(None), vec![1, 5, 3]);

	let cleared =
		service::update_item(&fx.app, &admin, ItemId(4), update_req(serde_json::json!({ "document": null })))
			.await
			.unwrap();
	assert_eq!(cleared.target, None);

	// Clearing the document leaves a link alone
	let kept = service::update_item(&fx.app, &admin, ItemId(5), update_req(serde_json::json!({ "document": null })))
		.await
		.unwrap();
	assert_eq!(kept.target, Some(MenuTarget::Link("index".into())));

	let relinked = service::update_item(
		&fx.app,
		&admin,
		ItemId(5),
		update_req(serde_json::json!({ "link": null, "document": 8 })),
	)
	.await
	.unwrap();
	assert_eq!(relinked.target, Some(MenuTarget::Document(DocumentId(8))));
}

// Delete //
//********//
#[tokio::test]
async fn test_delete_cascade() {
	let fx = fixture();
	fx.grant(Capability::ChangeChildren, "editors", 1);

	let removed = service::delete_item(&fx.app, &actor("eva", &["editors"]), ItemId(2), DeletePolicy::Cascade)
		.await
		.unwrap();
	assert_eq!(removed, vec![ItemId(2), ItemId(3), ItemId(4)]);
	let left: Vec<i64> = fx.menu.snapshot().iter().map(|i| i.id.0).collect();
	assert_eq!(left, vec![1, 5]);
}

#[tokio::test]
async fn test_delete_reparent() {
	let mut items = vec![item(6, Some(1), 1)];
	items.extend(fixture().menu.snapshot());
	let fx = build_app(items);

	let removed =
		service::delete_item(&fx.app, &superuser(), ItemId(2), DeletePolicy::Reparent).await.unwrap();
	assert_eq!(removed, vec![ItemId(2)]);
	assert_eq!(fx.children(Some(1)), vec![6, 3, 4]);
	assert!(fx.item(3).order > fx.item(6).order);
}

#[tokio::test]
async fn test_delete_needs_permission() {
	let fx = fixture();
	fx.grant(Capability::Edit, "staff", 3);

	let res = service::delete_item(&fx.app, &actor("sam", &["staff"]), ItemId(3), DeletePolicy::Cascade).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	fx.grant(Capability::Delete, "staff", 3);
	service::delete_item(&fx.app, &actor("sam", &["staff"]), ItemId(3), DeletePolicy::Cascade).await.unwrap();
	assert_eq!(fx.children(Some(2)), vec![4]);
}

// Permissions //
//*************//
#[tokio::test]
async fn test_item_permissions_admin_only() {
	let fx = fixture();
	fx.perms.add_group("staff");
	fx.grant(Capability::ChangeChildren, "staff", 1);

	let res = service::item_permissions(&fx.app, &actor("sam", &["staff"]), ItemId(2)).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	fx.grant_menu_admin("admins");
	let admin = actor("ada", &["admins"]);
	let rows = [
		GroupPermissions {
			group: "staff".into(),
			capabilities: BTreeSet::from([Capability::View, Capability::Edit]),
			restricted: false,
		},
		GroupPermissions {
			group: fx.app.opts.anonymous_group.clone(),
			capabilities: BTreeSet::from([Capability::View, Capability::Delete]),
			restricted: true,
		},
	];
	let matrix = service::save_item_permissions(&fx.app, &admin, ItemId(2), &rows).await.unwrap();

	let row = |group: &str| matrix.iter().find(|r| r.group.as_ref() == group).cloned().unwrap();
	assert_eq!(row("staff").capabilities, BTreeSet::from([Capability::View, Capability::Edit]));
	assert_eq!(row("Anonymous").capabilities, BTreeSet::from([Capability::View]));
	assert!(row("Anonymous").restricted);

	let res = service::item_permissions(&fx.app, &admin, ItemId(99)).await;
	assert!(matches!(res, Err(Error::NotFound)));
}

// vim: ts=4
