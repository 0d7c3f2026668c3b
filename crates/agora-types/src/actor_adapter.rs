//! Actors (the subject of a request) and where they come from.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::prelude::*;

/// The party performing a request. Anonymous visitors have no `id`
/// and carry only the anonymous group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
	pub id: Option<Box<str>>,
	pub groups: Box<[Box<str>]>,
	pub is_superuser: bool,
	pub lang: Option<Box<str>>,
}

impl Actor {
	pub fn anonymous(anonymous_group: &str) -> Self {
		Self {
			id: None,
			groups: Box::new([anonymous_group.into()]),
			is_superuser: false,
			lang: None,
		}
	}

	/// Adds `group` to the actor's groups unless it is already there.
	pub fn with_group(mut self, group: &str) -> Self {
		if !self.in_group(group) {
			let mut groups = self.groups.into_vec();
			groups.push(group.into());
			self.groups = groups.into_boxed_slice();
		}
		self
	}

	pub fn is_anonymous(&self) -> bool {
		self.id.is_none()
	}

	pub fn in_group(&self, group: &str) -> bool {
		self.groups.iter().any(|g| g.as_ref() == group)
	}

	/// Label for log lines.
	pub fn subject(&self) -> &str {
		self.id.as_deref().unwrap_or("anonymous")
	}
}

#[async_trait]
pub trait ActorAdapter: Debug + Send + Sync {
	/// Loads a user with its group memberships. `NotFound` for unknown users.
	async fn read_actor(&self, user_id: &str) -> AgResult<Actor>;

	async fn create_user(&self, user_id: &str, is_superuser: bool) -> AgResult<()>;

	/// Adds a membership, creating the group if needed.
	async fn add_user_to_group(&self, user_id: &str, group: &str) -> AgResult<()>;
}

// vim: ts=4
