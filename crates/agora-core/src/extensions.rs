//! Feature state registry
//!
//! Feature crates keep their shared state (sibling locks and the like) here,
//! keyed by type, so `AppState` does not depend on them. Every type is
//! registered once while the app is being built.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::prelude::*;

struct Registered {
	name: &'static str,
	value: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct Extensions {
	map: HashMap<TypeId, Registered>,
}

impl Extensions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `value`. A second registration of the same type is a wiring
	/// error and leaves the first one in place.
	pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> AgResult<()> {
		match self.map.entry(TypeId::of::<T>()) {
			Entry::Occupied(_) => {
				Err(Error::Internal(format!("Extension {} registered twice", type_name::<T>())))
			}
			Entry::Vacant(slot) => {
				slot.insert(Registered { name: type_name::<T>(), value: Box::new(value) });
				Ok(())
			}
		}
	}

	pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.map.get(&TypeId::of::<T>())?.value.downcast_ref::<T>()
	}

	/// Type names of everything registered, sorted.
	pub fn names(&self) -> Vec<&'static str> {
		let mut names: Vec<&'static str> = self.map.values().map(|entry| entry.name).collect();
		names.sort_unstable();
		names
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}
}


// vim: ts=4
