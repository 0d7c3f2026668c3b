//! App state type

use std::net::IpAddr;
use std::sync::Arc;

use ipnetwork::IpNetwork;

use crate::extensions::Extensions;
use crate::prelude::*;

use agora_types::actor_adapter::ActorAdapter;
use agora_types::content::ContentResolver;
use agora_types::menu_adapter::MenuAdapter;
use agora_types::perm_store::PermissionStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub menu_adapter: Arc<dyn MenuAdapter>,
	pub perm_store: Arc<dyn PermissionStore>,
	pub actor_adapter: Arc<dyn ActorAdapter>,
	pub content: Arc<dyn ContentResolver>,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> AgResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}
}

pub type App = Arc<AppState>;

#[derive(Default)]
pub struct Adapters {
	pub menu_adapter: Option<Arc<dyn MenuAdapter>>,
	pub perm_store: Option<Arc<dyn PermissionStore>>,
	pub actor_adapter: Option<Arc<dyn ActorAdapter>>,
	pub content: Option<Arc<dyn ContentResolver>>,
}

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Request header carrying the authenticated user id, set by the fronting proxy
	pub identity_header: Box<str>,
	/// Group every anonymous visitor belongs to
	pub anonymous_group: Box<str>,
	/// Group of visitors from the university network
	pub university_group: Box<str>,
	pub default_lang: Box<str>,
	/// Route table for link targets: `("polls:index", "/polls/")`
	pub routes: Box<[(Box<str>, Box<str>)]>,
	/// Path prefix documents are served under
	pub document_path: Box<str>,
	/// Anonymous visitors from one of these networks also get the paired group.
	/// The first matching range wins.
	pub anonymous_ip_ranges: Box<[(IpNetwork, Box<str>)]>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			identity_header: "x-remote-user".into(),
			anonymous_group: "Anonymous".into(),
			university_group: "University Network".into(),
			default_lang: "en".into(),
			routes: Box::new([]),
			document_path: "/documents/".into(),
			anonymous_ip_ranges: Box::new([]),
		}
	}
}

impl AppBuilderOpts {
	/// Groups that may only ever hold the `View` capability.
	pub fn is_restricted_group(&self, group: &str) -> bool {
		group == self.anonymous_group.as_ref() || group == self.university_group.as_ref()
	}

	/// Group granted to anonymous visitors connecting from `ip`.
	pub fn ip_range_group(&self, ip: IpAddr) -> Option<&str> {
		self.anonymous_ip_ranges
			.iter()
			.find(|(network, _)| network.contains(ip))
			.map(|(_, group)| group.as_ref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opts(ranges: &[(&str, &str)]) -> AppBuilderOpts {
		AppBuilderOpts {
			anonymous_ip_ranges: ranges
				.iter()
				.map(|(net, group)| (net.parse::<IpNetwork>().unwrap(), Box::<str>::from(*group)))
				.collect(),
			..Default::default()
		}
	}

	#[test]
	fn test_ip_range_group_first_match() {
		let opts = opts(&[("10.1.0.0/16", "Lab"), ("10.0.0.0/8", "University Network"), ("::1/128", "Local")]);

		assert_eq!(opts.ip_range_group("10.1.2.3".parse().unwrap()), Some("Lab"));
		assert_eq!(opts.ip_range_group("10.200.0.1".parse().unwrap()), Some("University Network"));
		assert_eq!(opts.ip_range_group("::1".parse().unwrap()), Some("Local"));
		assert_eq!(opts.ip_range_group("192.168.1.1".parse().unwrap()), None);
		assert_eq!(AppBuilderOpts::default().ip_range_group("127.0.0.1".parse().unwrap()), None);
	}
}

// vim: ts=4
