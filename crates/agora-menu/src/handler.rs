//! Menu API handlers

use axum::{
	Json,
	extract::{Path, Query, State, rejection::JsonRejection},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::order::OrderReport;
use crate::perm::GroupPermissions;
use crate::prelude::*;
use crate::proposal::Proposal;
use crate::service::{self, CreateMenuItemRequest, UpdateMenuItemRequest};
use crate::tree::DeletePolicy;
use crate::visibility::{ManageView, NavigationMenu};
use agora_core::{Auth, Viewer};
use agora_types::types::ApiResponse;

/// GET /api/menu - The menu as the current viewer may see it
pub async fn get_menu(
	State(app): State<App>,
	Viewer(viewer): Viewer,
) -> AgResult<(StatusCode, Json<ApiResponse<NavigationMenu>>)> {
	let menu = service::navigation(&app, &viewer).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(menu))))
}

/// GET /api/menu/manage - Everything the actor may rearrange
pub async fn get_manage(
	State(app): State<App>,
	Auth(actor): Auth,
) -> AgResult<(StatusCode, Json<ApiResponse<ManageView>>)> {
	let view = service::manage(&app, &actor).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(view))))
}

/// POST /api/menu/order - Apply a drag/drop order proposal
pub async fn post_order(
	State(app): State<App>,
	Auth(actor): Auth,
	body: Result<Json<Proposal>, JsonRejection>,
) -> AgResult<(StatusCode, Json<ApiResponse<OrderReport>>)> {
	let Json(proposal) = body.map_err(|rejection| Error::MalformedProposal(rejection.body_text()))?;
	let report = service::apply_order(&app, &actor, &proposal).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(report))))
}

/// POST /api/menu/items
pub async fn post_item(
	State(app): State<App>,
	Auth(actor): Auth,
	Json(req): Json<CreateMenuItemRequest>,
) -> AgResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
	let item = service::create_item(&app, &actor, req).await?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(item))))
}

/// PATCH /api/menu/items/{id}
pub async fn patch_item(
	State(app): State<App>,
	Auth(actor): Auth,
	Path(id): Path<i64>,
	Json(req): Json<UpdateMenuItemRequest>,
) -> AgResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
	let item = service::update_item(&app, &actor, ItemId(id), req).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(item))))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
	#[serde(default)]
	pub mode: DeletePolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
	pub removed: Vec<ItemId>,
}

/// DELETE /api/menu/items/{id}?mode=cascade|reparent
pub async fn delete_item(
	State(app): State<App>,
	Auth(actor): Auth,
	Path(id): Path<i64>,
	Query(query): Query<DeleteQuery>,
) -> AgResult<(StatusCode, Json<ApiResponse<DeleteResponse>>)> {
	let removed = service::delete_item(&app, &actor, ItemId(id), query.mode).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(DeleteResponse { removed }))))
}

/// GET /api/menu/items/{id}/perms
pub async fn get_item_perms(
	State(app): State<App>,
	Auth(actor): Auth,
	Path(id): Path<i64>,
) -> AgResult<(StatusCode, Json<ApiResponse<Vec<GroupPermissions>>>)> {
	let rows = service::item_permissions(&app, &actor, ItemId(id)).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(rows))))
}

/// PUT /api/menu/items/{id}/perms
pub async fn put_item_perms(
	State(app): State<App>,
	Auth(actor): Auth,
	Path(id): Path<i64>,
	Json(rows): Json<Vec<GroupPermissions>>,
) -> AgResult<(StatusCode, Json<ApiResponse<Vec<GroupPermissions>>>)> {
	let rows = service::save_item_permissions(&app, &actor, ItemId(id), &rows).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(rows))))
}

// vim: ts=4
