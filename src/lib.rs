//! # Reinhardt Assets
//!
//! Bundled static asset serving for Reinhardt.
//!
//! Groups of JavaScript or CSS files are concatenated into one response per
//! bundle. Each bundle is fingerprinted with an MD5 `ETag`, carries the newest
//! source's modification time as `Last-Modified`, and is rebuilt only when a
//! source changes.
//!
//! ## Feature Flags
//!
//! - `server` (default) - Router, TOML settings, hyper HTTP server and the
//!   `reinhardt-assets` binary
//!
//! Without `server` only the bundle core is compiled, for embedding into an
//! existing HTTP stack.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use reinhardt_assets::prelude::*;
//! use std::sync::Arc;
//!
//! let javascripts = BundleServer::new(["public/javascripts/**/*.js"])?;
//! let stylesheets = BundleServer::new(["public/stylesheets/**/*.css"])?
//!     .with_content_type("text/css");
//!
//! let router = AssetRouter::new()
//!     .mount("/javascripts/xall.js", Arc::new(javascripts))
//!     .mount("/stylesheets/xall.css", Arc::new(stylesheets));
//!
//! HttpServer::new(Arc::new(router))
//!     .listen("127.0.0.1:8000".parse()?)
//!     .await?;
//! ```

/// Bundle core: artifacts, fingerprints and cache coordination.
pub mod bundle {
	pub use reinhardt_bundle::*;
}

/// HTTP serving: router, settings and server.
#[cfg(feature = "server")]
pub mod server {
	pub use reinhardt_asset_server::*;
}

pub use reinhardt_bundle::{
	Artifact, AssetSource, BundleError, BundleRequest, BundleResponse, BundleResult, BundleServer,
	BundleStatistics, FileSystemSource, Fingerprint,
};

#[cfg(feature = "server")]
pub use reinhardt_asset_server::{
	AssetRouter, AssetSettings, Handler, HttpServer, ServerError, ServerResult, ShutdownCoordinator,
	build_router,
};

/// Common imports.
pub mod prelude {
	pub use reinhardt_bundle::{BundleRequest, BundleResponse, BundleServer, Fingerprint};

	#[cfg(feature = "server")]
	pub use reinhardt_asset_server::{
		AssetRouter, AssetSettings, Handler, HttpServer, ShutdownCoordinator, build_router,
		shutdown_signal,
	};
}
