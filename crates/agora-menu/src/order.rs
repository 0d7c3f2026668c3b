//! Applying order proposals.
//!
//! Placements are visited depth first in proposal order. Each one is either
//! applied or skipped on its own; a skipped node keeps its parent and order,
//! and the placed members of its group are numbered around it.
//! Only a structurally malformed proposal fails the whole operation, and it
//! does so before anything is written.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::perm::Authorizer;
use crate::prelude::*;
use crate::proposal::{Placement, Proposal};
use crate::tree::{GroupKey, MenuTree, Rejection, following_order};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
	/// The actor may not rearrange the proposed sibling group
	NotAuthorized,
	/// The actor may not take the item out of its current sibling group
	SourceNotAuthorized,
	Rejected(Rejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
	Applied,
	Unchanged,
	Skipped(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutcome {
	pub id: ItemId,
	pub parent: Option<ItemId>,
	pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FooterOutcome {
	/// No footer items were proposed
	#[default]
	Untouched,
	Applied,
	NotAuthorized,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
	pub nodes: Vec<NodeOutcome>,
	pub footer: FooterOutcome,
	/// Main menu roots whose subtree received an applied node
	pub roots: BTreeSet<ItemId>,
}

impl OrderReport {
	pub fn outcome(&self, id: ItemId) -> Option<Outcome> {
		self.nodes.iter().find(|node| node.id == id).map(|node| node.outcome)
	}

	pub fn skipped(&self) -> impl Iterator<Item = &NodeOutcome> {
		self.nodes.iter().filter(|node| matches!(node.outcome, Outcome::Skipped(_)))
	}

	pub fn applied_count(&self) -> usize {
		self.nodes.iter().filter(|node| node.outcome == Outcome::Applied).count()
	}
}

struct OrderVisitor<'a> {
	tree: &'a mut MenuTree,
	actor: &'a Actor,
	auth: Authorizer<'a>,
	/// Rearrange rights per sibling group parent, checked once each
	rearrange: HashMap<Option<ItemId>, bool>,
	/// Items placed per group, in proposal order
	placed: BTreeMap<GroupKey, Vec<ItemId>>,
	/// Skipped items; they keep their parent and order
	pinned: HashSet<ItemId>,
}

impl OrderVisitor<'_> {
	async fn may_rearrange(&mut self, parent: Option<ItemId>) -> AgResult<bool> {
		if let Some(allowed) = self.rearrange.get(&parent) {
			return Ok(*allowed);
		}
		let allowed = self.auth.may_rearrange(self.actor, parent).await?;
		if !allowed {
			info!(
				subject = %self.actor.subject(),
				group = %GroupKey::main(parent),
				"Actor may not rearrange sibling group"
			);
		}
		self.rearrange.insert(parent, allowed);
		Ok(allowed)
	}

	/// Moves the item of `placement` into its proposed group. The final order
	/// value is assigned by `settle_groups`.
	async fn visit(&mut self, placement: Placement) -> AgResult<Option<SkipReason>> {
		let skip = self.try_place(placement).await?;
		match skip {
			Some(_) => {
				self.pinned.insert(placement.id);
			}
			None => {
				self.placed.entry(GroupKey::main(placement.parent)).or_default().push(placement.id);
			}
		}
		Ok(skip)
	}

	async fn try_place(&mut self, placement: Placement) -> AgResult<Option<SkipReason>> {
		let current_parent = self.tree.item(placement.id)?.parent;

		if !self.may_rearrange(placement.parent).await? {
			return Ok(Some(SkipReason::NotAuthorized));
		}
		if current_parent == placement.parent {
			return Ok(None);
		}
		if !self.may_rearrange(current_parent).await? {
			return Ok(Some(SkipReason::SourceNotAuthorized));
		}
		if let Err(rejection) = self.tree.move_item(placement.id, placement.parent, placement.order) {
			debug!(
				item = %placement.id,
				parent = ?placement.parent,
				reason = ?rejection,
				"Rejected reparent"
			);
			return Ok(Some(SkipReason::Rejected(rejection)));
		}
		Ok(None)
	}

	async fn apply_footer(&mut self, proposal: &Proposal) -> AgResult<FooterOutcome> {
		if proposal.footer_items.is_empty() {
			return Ok(FooterOutcome::Untouched);
		}
		if !self.auth.is_menu_admin(self.actor).await? {
			info!(subject = %self.actor.subject(), "Actor may not reorder the footer");
			return Ok(FooterOutcome::NotAuthorized);
		}
		self.placed.insert(GroupKey::footer(), proposal.footer_ids().collect());
		Ok(FooterOutcome::Applied)
	}

	/// Numbers every placed group from zero: placed items in proposal order,
	/// then the members the proposal did not mention in their previous
	/// relative order. Values held by pinned members are never handed out.
	fn settle_groups(&mut self) -> AgResult<()> {
		for (key, placed) in &self.placed {
			let members = self.tree.group(*key);
			let held: HashSet<i32> = members
				.iter()
				.filter(|id| self.pinned.contains(*id))
				.filter_map(|id| self.tree.get(*id))
				.map(|item| item.order)
				.collect();
			let leftovers =
				members.iter().filter(|id| !placed.contains(id) && !self.pinned.contains(*id)).copied();
			let sequence: Vec<ItemId> = placed.iter().copied().chain(leftovers).collect();

			let mut next = 0i32;
			for id in sequence {
				while held.contains(&next) {
					next = following_order(next)?;
				}
				self.tree.set_order(id, next)?;
				next = following_order(next)?;
			}
		}
		Ok(())
	}
}

/// Applies `proposal` to `tree` on behalf of `actor`.
///
/// The caller persists `tree.changed_positions(..)` afterwards.
pub async fn apply_order(
	tree: &mut MenuTree,
	proposal: &Proposal,
	actor: &Actor,
	auth: Authorizer<'_>,
) -> AgResult<OrderReport> {
	proposal.validate(tree)?;
	let placements = proposal.placements()?;
	let before = tree.clone();

	let mut visitor = OrderVisitor {
		tree: &mut *tree,
		actor,
		auth,
		rearrange: HashMap::new(),
		placed: BTreeMap::new(),
		pinned: HashSet::new(),
	};
	let mut skips = Vec::with_capacity(placements.len());
	for placement in &placements {
		skips.push(visitor.visit(*placement).await?);
	}
	let footer = visitor.apply_footer(proposal).await?;
	visitor.settle_groups()?;

	let mut report = OrderReport { footer, ..Default::default() };
	for (placement, skip) in placements.iter().zip(skips) {
		let outcome = match skip {
			Some(reason) => Outcome::Skipped(reason),
			None => {
				let old = before.item(placement.id)?;
				let new = tree.item(placement.id)?;
				if (old.parent, old.order) == (new.parent, new.order) {
					Outcome::Unchanged
				} else {
					Outcome::Applied
				}
			}
		};
		report.nodes.push(NodeOutcome { id: placement.id, parent: placement.parent, outcome });
	}
	report.roots = tree.find_root_items(
		report.nodes.iter().filter(|node| node.outcome == Outcome::Applied).map(|node| node.id),
	)?;

	let skipped = report.skipped().count();
	if skipped > 0 {
		debug!(skipped = ?report.skipped().collect::<Vec<_>>(), "Skipped proposal nodes");
	}
	info!(
		subject = %actor.subject(),
		applied = report.applied_count(),
		skipped = skipped,
		footer = ?report.footer,
		"Applied menu order"
	);
	Ok(report)
}


// vim: ts=4
