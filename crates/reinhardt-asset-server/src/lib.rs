//! # Reinhardt Asset Server
//!
//! Serves [`reinhardt_bundle`] bundles over HTTP.
//!
//! ## Features
//!
//! - **Routing**: exact-path mounts with an optional fallback handler
//! - **Settings**: TOML settings file with environment overrides
//! - **HTTP/1.1**: hyper-based server with graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reinhardt_asset_server::{AssetSettings, HttpServer, build_router};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = AssetSettings::from_file(Path::new("assets.toml"))?;
//! let router = build_router(&settings)?;
//!
//! HttpServer::new(Arc::new(router))
//!     .listen(settings.server.socket_addr()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{AssetSettings, BundleSettings, HOST_ENV, PORT_ENV, ServerSettings, build_router};
pub use error::{ServerError, ServerResult};
pub use handler::{Handler, Request, Response};
pub use router::AssetRouter;
pub use server::{HttpServer, serve, serve_with_shutdown};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
