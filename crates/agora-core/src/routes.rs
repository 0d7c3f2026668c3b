//! Static route table used to resolve menu targets.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::app::AppBuilderOpts;
use crate::prelude::*;
use agora_types::content::ContentResolver;

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: HashMap<Box<str>, Box<str>>,
	document_path: Box<str>,
}

impl RouteTable {
	pub fn new<'a>(
		routes: impl IntoIterator<Item = (&'a str, &'a str)>,
		document_path: &str,
	) -> Self {
		Self {
			routes: routes.into_iter().map(|(name, path)| (name.into(), path.into())).collect(),
			document_path: document_path.into(),
		}
	}

	pub fn from_opts(opts: &AppBuilderOpts) -> Self {
		Self::new(opts.routes.iter().map(|(n, p)| (n.as_ref(), p.as_ref())), &opts.document_path)
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

#[async_trait]
impl ContentResolver for RouteTable {
	async fn document_url(&self, document: DocumentId) -> AgResult<Option<Box<str>>> {
		Ok(Some(format!("{}{}/", self.document_path, document).into()))
	}

	fn route_url(&self, link: &str) -> Option<Box<str>> {
		let (name, query) = match link.split_once('?') {
			Some((name, query)) => (name, Some(query)),
			None => (link, None),
		};
		let path = self.routes.get(name)?;
		Some(match query {
			Some(query) => format!("{}?{}", path, query).into(),
			None => path.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table() -> RouteTable {
		RouteTable::new([("index", "/"), ("minutes:list", "/minutes/")], "/documents/")
	}

	#[test]
	fn test_route_url_keeps_query() {
		let routes = table();
		assert_eq!(routes.route_url("index").as_deref(), Some("/"));
		assert_eq!(routes.route_url("minutes:list?groupid=3").as_deref(), Some("/minutes/?groupid=3"));
		assert_eq!(routes.route_url("www.example.com"), None);
	}

	#[tokio::test]
	async fn test_document_url() {
		let url = table().document_url(DocumentId(42)).await.unwrap();
		assert_eq!(url.as_deref(), Some("/documents/42/"));
	}
}

// vim: ts=4
