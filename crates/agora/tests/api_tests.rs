//! HTTP API tests
//!
//! Drives the full router (identity middleware included) with in-memory
//! adapters.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use agora::AppBuilder;
use agora::actor_adapter::ActorAdapter;
use agora::menu::{LocalizedText, MenuItem, MenuTarget, MenuType};
use agora::menu_tree::memory::{MemoryActorAdapter, MemoryMenuAdapter, MemoryPermissionStore};
use agora::perm_store::{Capability, ObjectRef};
use agora::types::{DocumentId, ItemId};

fn item(id: i64, parent: Option<i64>, order: i32, document: Option<i64>) -> MenuItem {
	MenuItem {
		id: ItemId(id),
		title: LocalizedText::new(format!("Item {}", id), format!("Eintrag {}", id)),
		order,
		target: document.map(|d| MenuTarget::Document(DocumentId(d))),
		parent: parent.map(ItemId),
		menu_type: MenuType::MainMenu,
	}
}

/// 1 (document 4)
/// 2 ── 3 (visible to the university network)
async fn router() -> axum::Router {
	let menu = Arc::new(MemoryMenuAdapter::with_items([
		item(1, None, 0, Some(4)),
		item(2, None, 1, None),
		item(3, Some(2), 0, None),
	]));
	let perms = Arc::new(MemoryPermissionStore::new());
	perms.grant(Capability::ChangeChildren, "admins", &ObjectRef::menu_items());
	perms.grant(Capability::View, "Anonymous", &ObjectRef::MenuItem(ItemId(1)));
	perms.grant(Capability::View, "University Network", &ObjectRef::MenuItem(ItemId(3)));

	let actors = Arc::new(MemoryActorAdapter::new());
	actors.create_user("ada", false).await.unwrap();
	actors.add_user_to_group("ada", "admins").await.unwrap();
	actors.create_user("sam", false).await.unwrap();

	let mut builder = AppBuilder::new();
	builder
		.identity_header("x-remote-user")
		.routes([("index", "/")])
		.anonymous_ip_ranges([("10.0.0.0/8".parse::<ipnetwork::IpNetwork>().unwrap(), "University Network")])
		.menu_adapter(menu)
		.perm_store(perms)
		.actor_adapter(actors);
	agora::routes::init(builder.build().unwrap())
}

async fn call(router: &axum::Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
	let mut req = Request::builder().method(method).uri(uri);
	if let Some(user) = user {
		req = req.header("x-remote-user", user);
	}
	let req = match body {
		Some(body) => req.header("content-type", "application/json").body(Body::from(body.to_string())),
		None => req.body(Body::empty()),
	}
	.unwrap();

	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
	(status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_anonymous_navigation() {
	let router = router().await;
	let (status, body) = call(&router, Method::GET, "/api/menu", None, None).await;

	assert_eq!(status, StatusCode::OK);
	let main = body["data"]["mainMenuItems"].as_array().unwrap();
	assert_eq!(main.len(), 1);
	assert_eq!(main[0]["id"], 1);
	assert_eq!(main[0]["url"], "/documents/4/");
	assert!(body["time"].is_number());
}

#[tokio::test]
async fn test_accept_language_selects_titles() {
	let router = router().await;
	let req = Request::builder()
		.uri("/api/menu")
		.header("accept-language", "de-DE,de;q=0.9")
		.body(Body::empty())
		.unwrap();
	let res = router.oneshot(req).await.unwrap();
	let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let body: Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(body["data"]["mainMenuItems"][0]["title"], "Eintrag 1");
}

#[tokio::test]
async fn test_university_network_navigation() {
	let router = router().await;
	let from = |peer: &str| {
		let mut req = Request::builder().uri("/api/menu").body(Body::empty()).unwrap();
		req.extensions_mut().insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
		req
	};

	let res = router.clone().oneshot(from("10.20.30.40:5000")).await.unwrap();
	let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let body: Value = serde_json::from_slice(&bytes).unwrap();
	let main = body["data"]["mainMenuItems"].as_array().unwrap();
	let ids: Vec<i64> = main.iter().map(|e| e["id"].as_i64().unwrap()).collect();
	assert_eq!(ids, vec![1, 2]);
	assert_eq!(main[1]["children"][0]["id"], 3);

	// Outside the range only the anonymous grants apply
	let res = router.oneshot(from("192.168.1.10:5000")).await.unwrap();
	let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let body: Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(body["data"]["mainMenuItems"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_writes_need_an_identity() {
	let router = router().await;
	let proposal = json!({ "main_menu_items": [{ "id": 2 }, { "id": 1 }] });

	let (status, body) = call(&router, Method::POST, "/api/menu/order", None, Some(proposal.clone())).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"]["code"], "E-PERM");

	// Unknown users fall back to anonymous
	let (status, _) = call(&router, Method::POST, "/api/menu/order", Some("mallory"), Some(proposal)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_order_round_trip() {
	let router = router().await;

	let proposal = json!({ "main_menu_items": [{ "id": 2, "children": [{ "id": 3 }] }, { "id": 1 }] });
	let (status, body) = call(&router, Method::POST, "/api/menu/order", Some("ada"), Some(proposal)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["footer"], "untouched");
	assert_eq!(body["data"]["roots"], json!([1, 2]));

	let (status, body) = call(&router, Method::GET, "/api/menu/manage", Some("ada"), None).await;
	assert_eq!(status, StatusCode::OK);
	let ids: Vec<i64> =
		body["data"]["mainMenuItems"].as_array().unwrap().iter().map(|e| e["id"].as_i64().unwrap()).collect();
	assert_eq!(ids, vec![2, 1]);

	// A plain user only sees the reorder skipped
	let proposal = json!({ "main_menu_items": [{ "id": 1 }, { "id": 2 }] });
	let (status, body) = call(&router, Method::POST, "/api/menu/order", Some("sam"), Some(proposal)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["nodes"][0]["outcome"]["skipped"], "notAuthorized");
}

#[tokio::test]
async fn test_error_codes() {
	let router = router().await;

	let proposal = json!({ "main_menu_items": [{ "id": 77 }] });
	let (status, body) = call(&router, Method::POST, "/api/menu/order", Some("ada"), Some(proposal)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"]["code"], "E-PROPOSAL");

	// Bodies that do not deserialize are malformed proposals too
	for proposal in [json!({ "main_menu_items": [{ "id": "x" }] }), json!({ "main_menu_items": { "id": 1 } })] {
		let (status, body) = call(&router, Method::POST, "/api/menu/order", Some("ada"), Some(proposal)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"]["code"], "E-PROPOSAL");
	}

	let (status, body) = call(&router, Method::PATCH, "/api/menu/items/2", Some("ada"), Some(json!({ "parent": 3 }))).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"]["code"], "E-INVARIANT");

	let (status, body) = call(
		&router,
		Method::POST,
		"/api/menu/items",
		Some("ada"),
		Some(json!({ "title": { "en": "Both" }, "link": "index", "document": 9 })),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"]["code"], "E-VALIDATION");

	let (status, body) = call(&router, Method::DELETE, "/api/menu/items/42", Some("ada"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"]["code"], "E-NOTFOUND");
}

#[tokio::test]
async fn test_item_lifecycle() {
	let router = router().await;

	let (status, body) = call(
		&router,
		Method::POST,
		"/api/menu/items",
		Some("ada"),
		Some(json!({ "title": { "en": "Polls" }, "link": "index", "parent": 2 })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let id = body["data"]["id"].as_i64().unwrap();
	assert_eq!(body["data"]["order"], 1);

	let (status, body) = call(
		&router,
		Method::PUT,
		&format!("/api/menu/items/{}/perms", id),
		Some("ada"),
		Some(json!([{ "group": "Anonymous", "capabilities": ["view", "edit"] }])),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let anonymous = body["data"].as_array().unwrap().iter().find(|r| r["group"] == "Anonymous").unwrap();
	assert_eq!(anonymous["capabilities"], json!(["view"]));

	let (status, body) =
		call(&router, Method::DELETE, "/api/menu/items/2?mode=reparent", Some("ada"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["removed"], json!([2]));

	let (_, body) = call(&router, Method::GET, "/api/menu", None, None).await;
	let ids: Vec<i64> =
		body["data"]["mainMenuItems"].as_array().unwrap().iter().map(|e| e["id"].as_i64().unwrap()).collect();
	assert_eq!(ids, vec![1, id]);
}

// vim: ts=4
