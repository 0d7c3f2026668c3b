//! Sibling-group locks.
//!
//! Every write to the menu holds the locks of the sibling groups it touches.
//! Locks are taken in `GroupKey` order so two writers never wait on each other
//! in a circle.

use itertools::Itertools;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::prelude::*;
use crate::proposal::Proposal;
use crate::tree::{GroupKey, MenuTree};

#[derive(Debug, Default)]
pub struct SiblingLocks {
	locks: Mutex<HashMap<GroupKey, Arc<AsyncMutex<()>>>>,
}

/// Held locks. Released on drop.
#[derive(Debug)]
pub struct GroupGuard {
	keys: BTreeSet<GroupKey>,
	_guards: Vec<OwnedMutexGuard<()>>,
}

impl GroupGuard {
	pub fn covers(&self, keys: &BTreeSet<GroupKey>) -> bool {
		keys.is_subset(&self.keys)
	}

	pub fn keys(&self) -> &BTreeSet<GroupKey> {
		&self.keys
	}
}

impl SiblingLocks {
	pub fn new() -> Self {
		Self::default()
	}

	fn handles(&self, keys: &BTreeSet<GroupKey>) -> Vec<Arc<AsyncMutex<()>>> {
		let mut locks = self.locks.lock();
		// Entries nobody holds or waits for can go
		locks.retain(|_, lock| Arc::strong_count(lock) > 1);
		keys.iter().map(|key| locks.entry(*key).or_default().clone()).collect()
	}

	/// Waits for every lock in `keys`, in key order.
	pub async fn acquire(&self, keys: BTreeSet<GroupKey>) -> GroupGuard {
		let mut guards = Vec::with_capacity(keys.len());
		for lock in self.handles(&keys) {
			guards.push(lock.lock_owned().await);
		}
		debug!(groups = %keys.iter().join(", "), "Acquired sibling group locks");
		GroupGuard { keys, _guards: guards }
	}
}

/// Adds the group `parent` heads plus the groups below each of its ancestors.
fn add_destination(tree: &MenuTree, parent: Option<ItemId>, keys: &mut BTreeSet<GroupKey>) -> AgResult<()> {
	keys.insert(GroupKey::main(parent));
	if let Some(parent) = parent {
		if tree.get(parent).is_some() {
			for ancestor in tree.ancestors(parent)? {
				keys.insert(GroupKey::main(Some(ancestor?)));
			}
		}
	}
	Ok(())
}

/// Groups an order proposal may touch, computed against `tree`.
///
/// For each node: its current group, its proposed group, and the groups along
/// the proposed parent's ancestor chain. Two proposals that could together
/// close a cycle always share one of these keys.
pub fn order_lock_set(tree: &MenuTree, proposal: &Proposal) -> AgResult<BTreeSet<GroupKey>> {
	let mut keys = BTreeSet::new();
	for placement in proposal.placements()? {
		if let Some(item) = tree.get(placement.id) {
			keys.insert(GroupKey::of(item));
		}
		add_destination(tree, placement.parent, &mut keys)?;
	}
	if !proposal.footer_items.is_empty() {
		keys.insert(GroupKey::footer());
	}
	Ok(keys)
}

/// Groups touched by moving `id` under `new_parent`.
pub fn move_lock_set(tree: &MenuTree, id: ItemId, new_parent: Option<ItemId>) -> AgResult<BTreeSet<GroupKey>> {
	let mut keys = BTreeSet::new();
	keys.insert(GroupKey::of(tree.item(id)?));
	add_destination(tree, new_parent, &mut keys)?;
	Ok(keys)
}


// vim: ts=4
