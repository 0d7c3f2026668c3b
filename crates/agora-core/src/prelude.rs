pub use crate::app::App;
pub use agora_types::prelude::*;

// vim: ts=4
