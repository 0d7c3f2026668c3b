//! Custom extractors for Agora-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;
use agora_types::actor_adapter::Actor;

// Viewer //
//********//
/// Whoever is making the request, anonymous visitors included.
/// Inserted by the identity middleware.
#[derive(Debug, Clone)]
pub struct Viewer(pub Actor);

impl<S> FromRequestParts<S> for Viewer
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(viewer) = parts.extensions.get::<Viewer>().cloned() {
			Ok(viewer)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// Auth //
//******//
/// An authenticated actor. Rejects anonymous visitors.
#[derive(Debug, Clone)]
pub struct Auth(pub Actor);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		match parts.extensions.get::<Viewer>() {
			Some(Viewer(actor)) if !actor.is_anonymous() => Ok(Auth(actor.clone())),
			_ => Err(Error::PermissionDenied),
		}
	}
}

// vim: ts=4
