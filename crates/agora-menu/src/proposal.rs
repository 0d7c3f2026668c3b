//! Order proposals as sent by the drag/drop editor.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::prelude::*;
use crate::tree::MenuTree;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Proposal {
	#[serde(default)]
	pub main_menu_items: Vec<ProposalNode>,
	#[serde(default)]
	pub footer_items: Vec<FooterEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalNode {
	pub id: ItemId,
	#[serde(default)]
	pub children: Vec<ProposalNode>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FooterEntry {
	pub id: ItemId,
}

/// Requested position of one main menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
	pub id: ItemId,
	pub parent: Option<ItemId>,
	/// Index within the proposed sibling list
	pub order: i32,
}

pub(crate) fn index_to_order(index: usize) -> AgResult<i32> {
	i32::try_from(index).map_err(|_| Error::MalformedProposal("too many siblings".into()))
}

fn collect_placements(
	nodes: &[ProposalNode],
	parent: Option<ItemId>,
	out: &mut Vec<Placement>,
) -> AgResult<()> {
	for (index, node) in nodes.iter().enumerate() {
		out.push(Placement { id: node.id, parent, order: index_to_order(index)? });
		collect_placements(&node.children, Some(node.id), out)?;
	}
	Ok(())
}

impl Proposal {
	pub fn is_empty(&self) -> bool {
		self.main_menu_items.is_empty() && self.footer_items.is_empty()
	}

	/// Main menu placements in depth-first, sibling-ordered traversal.
	pub fn placements(&self) -> AgResult<Vec<Placement>> {
		let mut out = Vec::new();
		collect_placements(&self.main_menu_items, None, &mut out)?;
		Ok(out)
	}

	pub fn footer_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
		self.footer_items.iter().map(|entry| entry.id)
	}

	/// Structural check against the current tree. Runs before any write.
	///
	/// Every id must exist, appear once, and belong to the menu it is listed in.
	pub fn validate(&self, tree: &MenuTree) -> AgResult<()> {
		let mut seen = HashSet::new();
		let main = self.placements()?.into_iter().map(|p| (p.id, MenuType::MainMenu));
		let footer = self.footer_ids().map(|id| (id, MenuType::Footer));

		for (id, menu_type) in main.chain(footer) {
			if !seen.insert(id) {
				return Err(Error::MalformedProposal(format!("item {} is listed more than once", id)));
			}
			let Some(item) = tree.get(id) else {
				return Err(Error::MalformedProposal(format!("unknown menu item {}", id)));
			};
			if item.menu_type != menu_type {
				return Err(Error::MalformedProposal(format!(
					"item {} is listed in the wrong menu",
					id
				)));
			}
		}
		Ok(())
	}
}


// vim: ts=4
