//! Shared types, adapter traits, and core utilities for the Agora portal.
//!
//! This crate contains the foundational types that are shared between the
//! feature crates and all adapter implementations: identifiers, the menu data
//! model, the capability model, and the storage traits the core depends on.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod actor_adapter;
pub mod content;
pub mod error;
pub mod menu;
pub mod menu_adapter;
pub mod perm_store;
pub mod prelude;
pub mod types;

// vim: ts=4
