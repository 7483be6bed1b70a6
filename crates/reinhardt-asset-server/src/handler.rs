//! Request handler abstraction shared by the router and the HTTP server.

use crate::error::ServerResult;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::sync::Arc;

/// Buffered HTTP request
pub type Request = http::Request<Bytes>;

/// Buffered HTTP response
pub type Response = http::Response<Bytes>;

/// Handles an HTTP request and produces a response.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed. The HTTP server
	/// answers such requests with 500.
	async fn handle(&self, request: Request) -> ServerResult<Response>;
}

/// Blanket implementation for `Arc<T>` where T: Handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> ServerResult<Response> {
		(**self).handle(request).await
	}
}

/// Builds a `text/plain` response.
///
/// # Examples
///
/// ```rust
/// use reinhardt_asset_server::handler::text_response;
/// use http::StatusCode;
///
/// let response = text_response(StatusCode::NOT_FOUND, "Not found");
/// assert_eq!(response.headers()["content-length"], "9");
/// ```
pub fn text_response(status: StatusCode, body: &'static str) -> Response {
	let mut response = http::Response::new(Bytes::from_static(body.as_bytes()));
	*response.status_mut() = status;
	let headers = response.headers_mut();
	headers.insert(CONTENT_TYPE, http::HeaderValue::from_static("text/plain"));
	headers.insert(CONTENT_LENGTH, http::HeaderValue::from(body.len()));
	response
}
