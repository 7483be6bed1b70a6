//! Asset server settings
//!
//! Settings are read from a TOML file:
//!
//! ```toml
//! root = "public"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [[bundles]]
//! path = "/javascripts/xall.js"
//! patterns = ["javascripts/**/*.js"]
//!
//! [[bundles]]
//! path = "/stylesheets/xall.css"
//! patterns = ["stylesheets/**/*.css"]
//! content_type = "text/css"
//! ```

use crate::error::{ServerError, ServerResult};
use crate::router::AssetRouter;
use reinhardt_bundle::BundleServer;
use serde::Deserialize;
use std::collections::HashSet;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding [`ServerSettings::host`].
pub const HOST_ENV: &str = "REINHARDT_ASSETS_HOST";

/// Environment variable overriding [`ServerSettings::port`].
pub const PORT_ENV: &str = "REINHARDT_ASSETS_PORT";

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSettings {
	/// Base directory for relative bundle patterns
	#[serde(default)]
	pub root: Option<PathBuf>,

	/// Listener settings
	#[serde(default)]
	pub server: ServerSettings,

	/// Mounted bundles
	#[serde(default)]
	pub bundles: Vec<BundleSettings>,
}

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
	/// Bind host
	pub host: String,
	/// Bind port
	pub port: u16,
	/// Seconds to wait for open connections on shutdown
	pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8000,
			shutdown_timeout_secs: 30,
		}
	}
}

impl ServerSettings {
	/// Resolves `host:port` to a socket address.
	///
	/// # Errors
	///
	/// Returns [`ServerError::Settings`] if the host does not resolve.
	pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
		(self.host.as_str(), self.port)
			.to_socket_addrs()?
			.next()
			.ok_or_else(|| ServerError::Settings(format!("Host {} did not resolve", self.host)))
	}
}

/// One mounted bundle
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleSettings {
	/// Exact request path, e.g. `/javascripts/xall.js`
	pub path: String,
	/// Glob patterns, concatenated in order
	pub patterns: Vec<String>,
	/// Response content type, `text/javascript` when absent
	#[serde(default)]
	pub content_type: Option<String>,
	/// `max-age` for fingerprinted URLs, one year when absent
	#[serde(default)]
	pub max_age: Option<u64>,
}

impl AssetSettings {
	/// Parses and validates settings from a TOML string.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_asset_server::AssetSettings;
	///
	/// let settings = AssetSettings::from_toml_str(r#"
	/// [[bundles]]
	/// path = "/javascripts/xall.js"
	/// patterns = ["public/javascripts/*.js"]
	/// "#).unwrap();
	/// assert_eq!(settings.server.port, 8000);
	/// assert_eq!(settings.bundles.len(), 1);
	/// ```
	pub fn from_toml_str(content: &str) -> ServerResult<Self> {
		let settings: Self = toml::from_str(content)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads, parses and validates a settings file.
	///
	/// A relative `root` is taken relative to the file's directory.
	pub fn from_file(path: &Path) -> ServerResult<Self> {
		let content = std::fs::read_to_string(path)?;
		let mut settings = Self::from_toml_str(&content)?;

		if let Some(root) = &settings.root
			&& root.is_relative()
			&& let Some(parent) = path.parent()
		{
			settings.root = Some(parent.join(root));
		}

		Ok(settings)
	}

	/// Checks mount paths and patterns.
	///
	/// # Errors
	///
	/// Returns [`ServerError::Settings`] when a path does not start with `/`,
	/// a path is mounted twice, or a bundle has no patterns.
	pub fn validate(&self) -> ServerResult<()> {
		let mut seen = HashSet::new();
		for bundle in &self.bundles {
			if !bundle.path.starts_with('/') {
				return Err(ServerError::Settings(format!(
					"Bundle path {:?} must start with '/'",
					bundle.path
				)));
			}
			if !seen.insert(bundle.path.as_str()) {
				return Err(ServerError::Settings(format!(
					"Bundle path {:?} is mounted more than once",
					bundle.path
				)));
			}
			if bundle.patterns.is_empty() {
				return Err(ServerError::Settings(format!(
					"Bundle {:?} has no patterns",
					bundle.path
				)));
			}
		}
		Ok(())
	}

	/// Applies [`HOST_ENV`] and [`PORT_ENV`] from the process environment.
	pub fn apply_env_overrides(&mut self) -> ServerResult<()> {
		self.apply_overrides_from(|key| std::env::var(key).ok())
	}

	/// Applies host/port overrides from `lookup`.
	///
	/// # Errors
	///
	/// Returns [`ServerError::Settings`] if the port override is not a number.
	pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ServerResult<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(host) = lookup(HOST_ENV) {
			self.server.host = host;
		}
		if let Some(port) = lookup(PORT_ENV) {
			self.server.port = port.parse().map_err(|_| {
				ServerError::Settings(format!("{} is not a valid port: {:?}", PORT_ENV, port))
			})?;
		}
		Ok(())
	}

	/// Patterns of `bundle` with relative entries joined onto `root`.
	pub fn resolved_patterns(&self, bundle: &BundleSettings) -> Vec<String> {
		bundle
			.patterns
			.iter()
			.map(|pattern| match &self.root {
				Some(root) if Path::new(pattern).is_relative() => {
					root.join(pattern).to_string_lossy().into_owned()
				}
				_ => pattern.clone(),
			})
			.collect()
	}
}

/// Builds a router with one bundle server per configured bundle.
///
/// # Errors
///
/// Returns [`ServerError::Bundle`] if a pattern is not a valid glob.
pub fn build_router(settings: &AssetSettings) -> ServerResult<AssetRouter> {
	let mut router = AssetRouter::new();

	for bundle in &settings.bundles {
		let mut server = BundleServer::new(settings.resolved_patterns(bundle))?;
		if let Some(content_type) = &bundle.content_type {
			server = server.with_content_type(content_type.clone());
		}
		if let Some(max_age) = bundle.max_age {
			server = server.with_max_age(max_age);
		}

		tracing::info!(
			path = %bundle.path,
			sources = server.sources().len(),
			content_type = %server.content_type(),
			"Mounted bundle"
		);
		router = router.mount(bundle.path.clone(), Arc::new(server));
	}

	Ok(router)
}
