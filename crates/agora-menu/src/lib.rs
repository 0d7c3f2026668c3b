//! Hierarchical navigation menus.
//!
//! The menu is a forest of main menu items plus a flat footer. Editors
//! rearrange it through order proposals; every structural change is checked
//! against the tree rules and the actor's capabilities before it is written.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod link;
pub mod lock;
pub mod memory;
pub mod order;
pub mod perm;
pub mod proposal;
pub mod service;
pub mod tree;
pub mod visibility;

mod prelude;

use agora_core::extensions::Extensions;
use agora_types::error::AgResult;

pub use lock::SiblingLocks;
pub use order::OrderReport;
pub use proposal::Proposal;
pub use tree::{DeletePolicy, GroupKey, MenuTree};

/// Registers the shared state menu operations need. Call before the
/// `AppState` is built.
pub fn register(extensions: &mut Extensions) -> AgResult<()> {
	extensions.insert(SiblingLocks::new())
}

// vim: ts=4
