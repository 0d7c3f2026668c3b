//! Resolution of menu targets to URLs.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait ContentResolver: Debug + Send + Sync {
	/// URL of a document, `None` if the document no longer exists.
	async fn document_url(&self, document: DocumentId) -> AgResult<Option<Box<str>>>;

	/// URL for a `namespace:name[?query]` route reference, `None` if the route is unknown.
	fn route_url(&self, link: &str) -> Option<Box<str>>;
}

// vim: ts=4
