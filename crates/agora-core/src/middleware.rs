//! Request identity
//!
//! Authentication happens in front of this service. The proxy passes the
//! user id in a trusted header; requests without it are anonymous.
//! Anonymous requests from a configured network pick up that network's group.

use std::net::SocketAddr;

use axum::{
	extract::{ConnectInfo, Request, State},
	http::{HeaderMap, header},
	middleware::Next,
	response::Response,
};

use crate::extract::Viewer;
use crate::prelude::*;
use agora_types::actor_adapter::Actor;

/// First language tag of an `Accept-Language` header, lowercased.
fn accept_language(headers: &HeaderMap) -> Option<Box<str>> {
	let value = headers.get(header::ACCEPT_LANGUAGE)?.to_str().ok()?;
	let tag = value.split(',').next()?.split(';').next()?.trim();
	if tag.is_empty() || tag == "*" { None } else { Some(tag.to_ascii_lowercase().into()) }
}

/// Resolves the actor for a request and stores it as a `Viewer` extension.
pub async fn identify(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> Result<Response, Error> {
	let user_id = req
		.headers()
		.get(app.opts.identity_header.as_ref())
		.and_then(|v| v.to_str().ok())
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(ToOwned::to_owned);

	let mut actor = match user_id {
		Some(user_id) => match app.actor_adapter.read_actor(&user_id).await {
			Ok(actor) => actor,
			Err(Error::NotFound) => {
				warn!(subject = %user_id, "Unknown user in identity header, treating as anonymous");
				Actor::anonymous(&app.opts.anonymous_group)
			}
			Err(err) => return Err(err),
		},
		None => Actor::anonymous(&app.opts.anonymous_group),
	};

	if actor.is_anonymous() {
		let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip());
		if let Some(group) = peer.and_then(|ip| app.opts.ip_range_group(ip)) {
			debug!(peer = ?peer, group = %group, "Anonymous request from a known network");
			actor = actor.with_group(group);
		}
	}

	if actor.lang.is_none() {
		actor.lang =
			Some(accept_language(req.headers()).unwrap_or_else(|| app.opts.default_lang.clone()));
	}
	debug!(subject = %actor.subject(), lang = ?actor.lang, "Identified request");

	req.extensions_mut().insert(Viewer(actor));
	Ok(next.run(req).await)
}


// vim: ts=4
