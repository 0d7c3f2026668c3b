pub use agora_core::prelude::*;
pub use agora_types::actor_adapter::Actor;
pub use agora_types::menu::{MenuItem, MenuTarget, MenuType};

// vim: ts=4
