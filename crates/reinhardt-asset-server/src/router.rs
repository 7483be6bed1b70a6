//! Path-based dispatch to bundle servers
//!
//! An [`AssetRouter`] mounts each [`BundleServer`] at one exact request path,
//! e.g. `/javascripts/xall.js`. Requests for any other path are passed to a
//! fallback handler, or answered with 404 when there is none.

use crate::error::ServerResult;
use crate::handler::{Handler, Request, Response, text_response};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::ALLOW;
use http::{HeaderValue, Method, StatusCode};
use reinhardt_bundle::{BundleRequest, BundleServer};
use std::sync::Arc;

/// Dispatches requests to bundle servers by exact path.
#[derive(Default)]
pub struct AssetRouter {
	mounts: Vec<(String, Arc<BundleServer>)>,
	fallback: Option<Arc<dyn Handler>>,
}

impl AssetRouter {
	/// Creates a router with no mounts and no fallback.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mounts `server` at `path`, replacing any server already mounted there.
	///
	/// # Example
	///
	/// ```rust,ignore
	/// use reinhardt_asset_server::AssetRouter;
	/// use reinhardt_bundle::BundleServer;
	/// use std::sync::Arc;
	///
	/// let router = AssetRouter::new()
	///     .mount("/javascripts/xall.js", Arc::new(BundleServer::new(["public/javascripts/**/*.js"])?))
	///     .mount(
	///         "/stylesheets/xall.css",
	///         Arc::new(BundleServer::new(["public/stylesheets/**/*.css"])?.with_content_type("text/css")),
	///     );
	/// ```
	pub fn mount(mut self, path: impl Into<String>, server: Arc<BundleServer>) -> Self {
		let path = path.into();
		self.mounts.retain(|(mounted, _)| mounted != &path);
		self.mounts.push((path, server));
		self
	}

	/// Sets the handler for paths that have no mounted bundle.
	pub fn with_fallback(mut self, handler: Arc<dyn Handler>) -> Self {
		self.fallback = Some(handler);
		self
	}

	/// Bundle server mounted at `path`, if any.
	pub fn resolve(&self, path: &str) -> Option<&Arc<BundleServer>> {
		self.mounts
			.iter()
			.find(|(mounted, _)| mounted == path)
			.map(|(_, server)| server)
	}

	/// Mounted paths and servers, in mount order.
	pub fn mounts(&self) -> impl Iterator<Item = (&str, &Arc<BundleServer>)> {
		self.mounts
			.iter()
			.map(|(path, server)| (path.as_str(), server))
	}

	async fn serve_bundle(&self, server: Arc<BundleServer>, request: Request) -> Response {
		let head = request.method() == Method::HEAD;
		let bundle_request = BundleRequest::from_http(&request);
		let path = bundle_request.path.clone();

		// File reads and hashing are blocking
		let result = tokio::task::spawn_blocking(move || server.handle(&bundle_request)).await;

		let response = match result {
			Ok(Ok(response)) => response.into_http(),
			Ok(Err(e)) => {
				tracing::error!(path = %path, "Failed to serve bundle: {}", e);
				return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
			}
			Err(e) => {
				tracing::error!(path = %path, "Bundle task failed: {}", e);
				return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
			}
		};

		match response {
			Ok(mut response) => {
				if head {
					*response.body_mut() = Bytes::new();
				}
				response
			}
			Err(e) => {
				tracing::error!(path = %path, "Invalid bundle response: {}", e);
				text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
			}
		}
	}
}

#[async_trait]
impl Handler for AssetRouter {
	async fn handle(&self, request: Request) -> ServerResult<Response> {
		let Some(server) = self.resolve(request.uri().path()).cloned() else {
			return match &self.fallback {
				Some(fallback) => fallback.handle(request).await,
				None => Ok(text_response(StatusCode::NOT_FOUND, "Not found")),
			};
		};

		if request.method() != Method::GET && request.method() != Method::HEAD {
			let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
			response
				.headers_mut()
				.insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
			return Ok(response);
		}

		tracing::trace!(path = %request.uri().path(), "Dispatching to bundle");
		Ok(self.serve_bundle(server, request).await)
	}
}

impl std::fmt::Debug for AssetRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AssetRouter")
			.field("mounts", &self.mounts.iter().map(|(p, _)| p).collect::<Vec<_>>())
			.field("fallback", &self.fallback.is_some())
			.finish()
	}
}
