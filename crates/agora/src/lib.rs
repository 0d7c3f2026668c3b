//! Agora is the portal server built around navigable, permission-aware menus.
//!
//! # Features
//!
//! - Main menu and footer, arranged by drag/drop order proposals
//! - Per-group capabilities on single menu items
//! - Identity taken from a trusted header set by the fronting proxy

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from agora-types
pub use agora_types::actor_adapter;
pub use agora_types::content;
pub use agora_types::error;
pub use agora_types::menu;
pub use agora_types::menu_adapter;
pub use agora_types::perm_store;
pub use agora_types::types;

// Feature crate re-exports
pub use agora_menu as menu_tree;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
