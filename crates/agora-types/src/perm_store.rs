//! Per-object capability grants.
//!
//! Grants are held by groups. A store answers only what was granted:
//! superuser handling is the caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::actor_adapter::Actor;
use crate::prelude::*;

/// Content type name under which type-wide menu grants are stored.
pub const MENU_ITEM_CONTENT_TYPE: &str = "menuitem";

// Capability //
//************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	View,
	Edit,
	/// Rearrange, add and remove the object's direct children
	ChangeChildren,
	Delete,
}

impl Capability {
	pub const ALL: [Capability; 4] =
		[Capability::View, Capability::Edit, Capability::ChangeChildren, Capability::Delete];

	pub fn as_str(self) -> &'static str {
		match self {
			Capability::View => "view",
			Capability::Edit => "edit",
			Capability::ChangeChildren => "change_children",
			Capability::Delete => "delete",
		}
	}
}

impl std::str::FromStr for Capability {
	type Err = Error;

	fn from_str(s: &str) -> AgResult<Self> {
		match s {
			"view" => Ok(Capability::View),
			"edit" => Ok(Capability::Edit),
			"change_children" => Ok(Capability::ChangeChildren),
			"delete" => Ok(Capability::Delete),
			_ => Err(Error::ValidationError(format!("unknown capability {:?}", s))),
		}
	}
}

// ObjectRef //
//***********//
/// The object a grant applies to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectRef {
	MenuItem(ItemId),
	Document(DocumentId),
	/// Type-wide grant. `ContentType("menuitem")` with `ChangeChildren` is menu administration.
	ContentType(Box<str>),
}

impl ObjectRef {
	pub fn menu_items() -> Self {
		ObjectRef::ContentType(MENU_ITEM_CONTENT_TYPE.into())
	}

	/// Object whose `ChangeChildren` grant governs a sibling group.
	/// Root-level groups hang off the content type.
	pub fn group_parent(parent: Option<ItemId>) -> Self {
		parent.map_or_else(Self::menu_items, ObjectRef::MenuItem)
	}

	/// Storage encoding: `(object type, object key)`.
	pub fn to_key(&self) -> (&'static str, String) {
		match self {
			ObjectRef::MenuItem(id) => ("menuitem", id.to_string()),
			ObjectRef::Document(id) => ("document", id.to_string()),
			ObjectRef::ContentType(name) => ("contenttype", name.to_string()),
		}
	}

	pub fn from_key(typ: &str, key: &str) -> AgResult<Self> {
		let parse_id = || {
			key.parse::<i64>().map_err(|_| Error::Internal(format!("bad object key {:?}", key)))
		};
		match typ {
			"menuitem" => Ok(ObjectRef::MenuItem(ItemId(parse_id()?))),
			"document" => Ok(ObjectRef::Document(DocumentId(parse_id()?))),
			"contenttype" => Ok(ObjectRef::ContentType(key.into())),
			_ => Err(Error::Internal(format!("unknown object type {:?}", typ))),
		}
	}
}

impl std::fmt::Display for ObjectRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let (typ, key) = self.to_key();
		write!(f, "{}:{}", typ, key)
	}
}

#[async_trait]
pub trait PermissionStore: Debug + Send + Sync {
	/// True if any of the actor's groups holds `capability` on `object`.
	async fn has_capability(
		&self,
		actor: &Actor,
		capability: Capability,
		object: &ObjectRef,
	) -> AgResult<bool>;

	async fn assign(&self, capability: Capability, group: &str, object: &ObjectRef)
	-> AgResult<()>;

	async fn revoke(&self, capability: Capability, group: &str, object: &ObjectRef)
	-> AgResult<()>;

	async fn capabilities_for(
		&self,
		group: &str,
		object: &ObjectRef,
	) -> AgResult<BTreeSet<Capability>>;

	/// Every known group, sorted by name.
	async fn list_groups(&self) -> AgResult<Vec<Box<str>>>;
}


// vim: ts=4
