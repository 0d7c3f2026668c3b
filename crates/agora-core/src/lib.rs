//! Core infrastructure for the Agora portal.
//!
//! Shared by the feature crates and the server crate: application state,
//! the type-erased extension map, request identity and route resolution.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extensions;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod routes;

pub use app::{Adapters, App, AppBuilderOpts, AppState};
pub use extract::{Auth, Viewer};

// vim: ts=4
