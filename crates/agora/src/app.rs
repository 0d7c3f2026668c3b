//! App builder - constructs and runs the Agora application

use std::net::SocketAddr;
use std::sync::Arc;

use ipnetwork::IpNetwork;

use crate::prelude::*;
use crate::routes;
pub use agora_core::app::{Adapters, App, AppBuilderOpts, AppState, VERSION};
use agora_core::extensions::Extensions;
use agora_core::routes::RouteTable;
use agora_types::actor_adapter::ActorAdapter;
use agora_types::content::ContentResolver;
use agora_types::menu_adapter::MenuAdapter;
use agora_types::perm_store::PermissionStore;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { opts: AppBuilderOpts::default(), adapters: Adapters::default() }
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn identity_header(&mut self, identity_header: impl Into<Box<str>>) -> &mut Self {
		self.opts.identity_header = identity_header.into();
		self
	}
	pub fn anonymous_group(&mut self, anonymous_group: impl Into<Box<str>>) -> &mut Self {
		self.opts.anonymous_group = anonymous_group.into();
		self
	}
	pub fn university_group(&mut self, university_group: impl Into<Box<str>>) -> &mut Self {
		self.opts.university_group = university_group.into();
		self
	}
	pub fn default_lang(&mut self, default_lang: impl Into<Box<str>>) -> &mut Self {
		self.opts.default_lang = default_lang.into();
		self
	}
	pub fn routes(
		&mut self,
		routes: impl IntoIterator<Item = (impl Into<Box<str>>, impl Into<Box<str>>)>,
	) -> &mut Self {
		self.opts.routes = routes.into_iter().map(|(name, path)| (name.into(), path.into())).collect();
		self
	}
	pub fn document_path(&mut self, document_path: impl Into<Box<str>>) -> &mut Self {
		self.opts.document_path = document_path.into();
		self
	}
	pub fn anonymous_ip_ranges(
		&mut self,
		ranges: impl IntoIterator<Item = (IpNetwork, impl Into<Box<str>>)>,
	) -> &mut Self {
		self.opts.anonymous_ip_ranges =
			ranges.into_iter().map(|(network, group)| (network, group.into())).collect();
		self
	}

	// Adapters
	pub fn menu_adapter(&mut self, menu_adapter: Arc<dyn MenuAdapter>) -> &mut Self {
		self.adapters.menu_adapter = Some(menu_adapter);
		self
	}
	pub fn perm_store(&mut self, perm_store: Arc<dyn PermissionStore>) -> &mut Self {
		self.adapters.perm_store = Some(perm_store);
		self
	}
	pub fn actor_adapter(&mut self, actor_adapter: Arc<dyn ActorAdapter>) -> &mut Self {
		self.adapters.actor_adapter = Some(actor_adapter);
		self
	}
	/// Overrides URL resolution. Defaults to the configured route table.
	pub fn content(&mut self, content: Arc<dyn ContentResolver>) -> &mut Self {
		self.adapters.content = Some(content);
		self
	}

	/// Assembles the application state without serving it.
	pub fn build(self) -> AgResult<App> {
		let Some(menu_adapter) = self.adapters.menu_adapter else {
			error!("FATAL: No menu adapter configured");
			return Err(Error::Internal("No menu adapter configured".to_string()));
		};
		let Some(perm_store) = self.adapters.perm_store else {
			error!("FATAL: No permission store configured");
			return Err(Error::Internal("No permission store configured".to_string()));
		};
		let Some(actor_adapter) = self.adapters.actor_adapter else {
			error!("FATAL: No actor adapter configured");
			return Err(Error::Internal("No actor adapter configured".to_string()));
		};
		let content = match self.adapters.content {
			Some(content) => content,
			None => {
				let table = RouteTable::from_opts(&self.opts);
				info!("Resolving links through {} configured routes", table.len());
				Arc::new(table)
			}
		};

		// Build extensions map for feature-specific state
		let mut extensions = Extensions::new();
		agora_menu::register(&mut extensions).inspect_err(|err| error!("FATAL: {}", err))?;
		debug!(extensions = ?extensions.names(), "Registered extensions");

		Ok(Arc::new(AppState {
			opts: self.opts,
			menu_adapter,
			perm_store,
			actor_adapter,
			content,
			extensions,
		}))
	}

	pub async fn run(self) -> AgResult<()> {
		info!("Agora V{}", VERSION);

		let app = self.build()?;
		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			Error::Io(e)
		})?;
		info!("Listening on HTTP {}", app.opts.listen);
		axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
