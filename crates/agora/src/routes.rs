//! HTTP routes

use axum::{
	Router, middleware,
	routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::prelude::*;
use agora_core::middleware::identify;
use agora_menu::handler;

fn init_menu() -> Router<App> {
	Router::new()
		.route("/api/menu", get(handler::get_menu))
		.route("/api/menu/manage", get(handler::get_manage))
		.route("/api/menu/order", post(handler::post_order))
		.route("/api/menu/items", post(handler::post_item))
		.route("/api/menu/items/{id}", patch(handler::patch_item).delete(handler::delete_item))
		.route(
			"/api/menu/items/{id}/perms",
			get(handler::get_item_perms).put(handler::put_item_perms),
		)
}

pub fn init(app: App) -> Router {
	Router::new()
		.merge(init_menu())
		.route("/api/version", get(|| async { agora_core::app::VERSION }))
		.layer(middleware::from_fn_with_state(app.clone(), identify))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
