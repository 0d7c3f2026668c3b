use std::sync::Arc;
use std::{env, path};

use agora::AppBuilder;
use agora::error::AgResult;
use agora_meta_adapter_sqlite::MetaAdapterSqlite;
use ipnetwork::IpNetwork;

pub struct Config {
	pub listen: String,
	pub db_dir: path::PathBuf,
	pub identity_header: String,
	pub anonymous_group: String,
	pub university_group: String,
	pub default_lang: String,
	pub document_path: String,
	/// `name=/path` pairs separated by commas
	pub routes: Vec<(String, String)>,
	/// `cidr=Group` pairs separated by commas
	pub anonymous_ip_ranges: Vec<(IpNetwork, String)>,
}

fn var_or(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_routes(routes: &str) -> Vec<(String, String)> {
	routes.split(',')
		.filter_map(|pair| {
			let (name, path) = pair.split_once('=')?;
			let (name, path) = (name.trim(), path.trim());
			if name.is_empty() || path.is_empty() {
				tracing::warn!("Ignoring route entry {:?}", pair);
				return None;
			}
			Some((name.to_string(), path.to_string()))
		})
		.collect()
}

fn parse_ip_ranges(ranges: &str) -> Vec<(IpNetwork, String)> {
	ranges.split(',')
		.filter(|pair| !pair.trim().is_empty())
		.filter_map(|pair| {
			let (network, group) = pair.split_once('=')?;
			let group = group.trim();
			match network.trim().parse::<IpNetwork>() {
				Ok(network) if !group.is_empty() => Some((network, group.to_string())),
				_ => {
					tracing::warn!("Ignoring IP range entry {:?}", pair);
					None
				}
			}
		})
		.collect()
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> AgResult<()> {
	let university_group = var_or("UNIVERSITY_GROUP", "University Network");
	let config = Config {
		listen: var_or("LISTEN", "127.0.0.1:8080"),
		db_dir: path::PathBuf::from(var_or("DB_DIR", "./data")),
		identity_header: var_or("IDENTITY_HEADER", "x-remote-user"),
		anonymous_group: var_or("ANONYMOUS_GROUP", "Anonymous"),
		anonymous_ip_ranges: parse_ip_ranges(&var_or(
			"ANONYMOUS_IP_RANGES",
			&format!("127.0.0.0/8={}", university_group),
		)),
		university_group,
		default_lang: var_or("DEFAULT_LANG", "en"),
		document_path: var_or("DOCUMENT_PATH", "/documents/"),
		routes: parse_routes(&var_or("ROUTES", "index=/")),
	};

	let mut builder = AppBuilder::new();

	let meta = Arc::new(MetaAdapterSqlite::new(&config.db_dir).await?);
	// Restricted groups show up in the permission matrix from the start
	meta.create_group(&config.anonymous_group).await?;
	meta.create_group(&config.university_group).await?;

	builder
		.listen(config.listen)
		.identity_header(config.identity_header)
		.anonymous_group(config.anonymous_group)
		.university_group(config.university_group)
		.default_lang(config.default_lang)
		.document_path(config.document_path)
		.routes(config.routes)
		.anonymous_ip_ranges(config.anonymous_ip_ranges)
		.menu_adapter(meta.clone())
		.perm_store(meta.clone())
		.actor_adapter(meta);
	builder.run().await
}


// vim: ts=4
