//! Menu data model: items, targets, localized titles.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

// MenuType //
//**********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuType {
	MainMenu,
	Footer,
}

impl MenuType {
	pub fn as_code(self) -> &'static str {
		match self {
			MenuType::MainMenu => "M",
			MenuType::Footer => "F",
		}
	}

	pub fn from_code(code: &str) -> AgResult<Self> {
		match code {
			"M" => Ok(MenuType::MainMenu),
			"F" => Ok(MenuType::Footer),
			_ => Err(Error::Internal(format!("unknown menu type code {:?}", code))),
		}
	}
}

// LocalizedText //
//***************//
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
	pub en: Box<str>,
	#[serde(default)]
	pub de: Box<str>,
}

impl LocalizedText {
	pub fn new(en: impl Into<Box<str>>, de: impl Into<Box<str>>) -> Self {
		Self { en: en.into(), de: de.into() }
	}

	/// German for any `de*` language tag, English otherwise.
	/// An empty German title falls back to English.
	pub fn get(&self, lang: &str) -> &str {
		if lang.starts_with("de") && !self.de.is_empty() { &self.de } else { &self.en }
	}
}

// MenuTarget //
//************//
/// What a menu item points at. An item has at most one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuTarget {
	/// Named route reference, optionally with a query string (`minutes:list?groupid=3`)
	Link(Box<str>),
	Document(DocumentId),
}

impl MenuTarget {
	/// Builds a target from the two optional form fields. Empty links count as absent.
	pub fn from_parts(
		link: Option<&str>,
		document: Option<DocumentId>,
	) -> AgResult<Option<MenuTarget>> {
		let link = link.map(str::trim).filter(|l| !l.is_empty());
		match (link, document) {
			(Some(_), Some(_)) => Err(Error::ValidationError(
				"only one of document and link may be defined".into(),
			)),
			(Some(link), None) => Ok(Some(MenuTarget::Link(link.into()))),
			(None, Some(doc)) => Ok(Some(MenuTarget::Document(doc))),
			(None, None) => Ok(None),
		}
	}

	pub fn link(&self) -> Option<&str> {
		match self {
			MenuTarget::Link(link) => Some(link),
			MenuTarget::Document(_) => None,
		}
	}

	pub fn document(&self) -> Option<DocumentId> {
		match self {
			MenuTarget::Document(doc) => Some(*doc),
			MenuTarget::Link(_) => None,
		}
	}
}

// MenuItem //
//**********//
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
	pub id: ItemId,
	pub title: LocalizedText,
	pub order: i32,
	pub target: Option<MenuTarget>,
	pub parent: Option<ItemId>,
	pub menu_type: MenuType,
}

impl MenuItem {
	pub fn has_content(&self) -> bool {
		self.target.is_some()
	}

	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}
}


// vim: ts=4
