//! Typed request and response records for bundle serving
//!
//! Only the headers the bundle server reads or writes are modelled here.
//! Conversions to and from the `http` crate's types are provided for the
//! serving layer.

use crate::error::{BundleError, BundleResult};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use http::{HeaderValue, StatusCode};

/// Body of the fixed 404 response.
pub const NOT_FOUND_BODY: &str = "Not found";

/// Inbound request as seen by a bundle server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleRequest {
	/// Request path. Routing has already happened, so this is informational.
	pub path: String,
	/// Raw query string without the leading `?`. Empty queries are `None`.
	pub query: Option<String>,
	/// Raw `If-Modified-Since` header value.
	pub if_modified_since: Option<String>,
	/// Raw `If-None-Match` header value.
	pub if_none_match: Option<String>,
}

impl BundleRequest {
	/// Creates a request for `path` with no query and no conditional headers.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_bundle::BundleRequest;
	///
	/// let request = BundleRequest::new("/javascripts/xall.js")
	///     .with_query("cf3279b0d6bfa4351cae1e7d085164cd")
	///     .with_if_none_match("\"cf3279b0d6bfa4351cae1e7d085164cd\"");
	/// assert_eq!(request.query.as_deref(), Some("cf3279b0d6bfa4351cae1e7d085164cd"));
	/// ```
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Sets the query string. An empty string clears it.
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		let query = query.into();
		self.query = (!query.is_empty()).then_some(query);
		self
	}

	/// Sets `If-Modified-Since`.
	pub fn with_if_modified_since(mut self, value: impl Into<String>) -> Self {
		self.if_modified_since = Some(value.into());
		self
	}

	/// Sets `If-None-Match`.
	pub fn with_if_none_match(mut self, value: impl Into<String>) -> Self {
		self.if_none_match = Some(value.into());
		self
	}

	/// Builds a request from an `http` request.
	pub fn from_http<B>(request: &http::Request<B>) -> Self {
		Self::from_parts(request.uri(), request.headers())
	}

	fn from_parts(uri: &http::Uri, headers: &http::HeaderMap) -> Self {
		let header = |name: HeaderName| {
			headers
				.get(name)
				.and_then(|v| v.to_str().ok())
				.map(|s| s.to_string())
		};

		Self {
			path: uri.path().to_string(),
			query: uri.query().filter(|q| !q.is_empty()).map(|q| q.to_string()),
			if_modified_since: header(IF_MODIFIED_SINCE),
			if_none_match: header(IF_NONE_MATCH),
		}
	}
}

impl From<&http::request::Parts> for BundleRequest {
	fn from(parts: &http::request::Parts) -> Self {
		Self::from_parts(&parts.uri, &parts.headers)
	}
}

/// Response produced by a bundle server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResponse {
	/// Status code: 200, 304 or 404.
	pub status: StatusCode,
	/// Headers in emission order.
	pub headers: Vec<(HeaderName, String)>,
	/// Response body. Empty for 304.
	pub body: Bytes,
}

impl BundleResponse {
	/// Creates an empty response with the given status.
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: Vec::new(),
			body: Bytes::new(),
		}
	}

	/// Fixed response for a bundle with no sources.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_bundle::BundleResponse;
	/// use http::StatusCode;
	///
	/// let response = BundleResponse::not_found();
	/// assert_eq!(response.status, StatusCode::NOT_FOUND);
	/// assert_eq!(response.header("content-length"), Some("9"));
	/// ```
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
			.with_header(CONTENT_TYPE, "text/plain")
			.with_header(CONTENT_LENGTH, NOT_FOUND_BODY.len().to_string())
			.with_body(NOT_FOUND_BODY)
	}

	/// Appends a header.
	pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));
		self
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Looks up the first header with the given name, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Converts into an `http` response.
	///
	/// # Errors
	///
	/// Returns [`BundleError::InvalidHeader`] if a header value contains
	/// bytes that are not valid in HTTP headers.
	pub fn into_http(self) -> BundleResult<http::Response<Bytes>> {
		let mut response = http::Response::new(self.body);
		*response.status_mut() = self.status;

		let headers = response.headers_mut();
		for (name, value) in self.headers {
			let value = HeaderValue::from_str(&value)
				.map_err(|_| BundleError::InvalidHeader(format!("{}: {:?}", name, value)))?;
			headers.append(name, value);
		}

		Ok(response)
	}
}
