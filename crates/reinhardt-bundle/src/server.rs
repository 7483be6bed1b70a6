//! Cache coordinator serving a single bundle
//!
//! A [`BundleServer`] owns the current [`Artifact`] for one set of source
//! patterns. It rebuilds the artifact when a source changes and answers
//! conditional requests against it.

use crate::artifact::Artifact;
use crate::error::BundleResult;
use crate::message::{BundleRequest, BundleResponse};
use crate::source::{AssetSource, FileSystemSource};
use crate::stats::{BundleStatistics, Counters};
use http::StatusCode;
use http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Default `Content-Type` of bundle responses.
pub const DEFAULT_CONTENT_TYPE: &str = "text/javascript";

/// `max-age` granted to fingerprinted URLs.
pub const ONE_YEAR_IN_SECONDS: u64 = 31_536_000;

const BASE_CACHE_CONTROL: &str = "public, must-revalidate";

/// Serves one concatenated bundle with ETag and Last-Modified validation.
///
/// Source patterns are resolved once, at construction. Files created
/// afterwards are not picked up; modifications to matched files are.
///
/// # Example
///
/// ```rust,ignore
/// use reinhardt_bundle::{BundleRequest, BundleServer};
///
/// let server = BundleServer::new(["public/javascripts/**/*.js"])?;
/// let response = server.handle(&BundleRequest::new("/javascripts/xall.js"))?;
/// assert_eq!(response.status, http::StatusCode::OK);
/// ```
pub struct BundleServer<S: AssetSource = FileSystemSource> {
	source: S,
	sources: Vec<PathBuf>,
	content_type: String,
	max_age: u64,
	current: RwLock<Option<Arc<Artifact>>>,
	rebuild_lock: Mutex<()>,
	counters: Counters,
}

impl BundleServer<FileSystemSource> {
	/// Creates a server over the local file system.
	///
	/// # Errors
	///
	/// Returns [`crate::BundleError::Pattern`] if a pattern is not a valid glob.
	pub fn new<I, P>(patterns: I) -> BundleResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<str>,
	{
		Self::with_source(FileSystemSource, patterns)
	}
}

impl<S: AssetSource> BundleServer<S> {
	/// Creates a server reading through `source`.
	///
	/// Matches are concatenated in pattern order, then in match order within
	/// each pattern. A file matched by two patterns appears twice.
	///
	/// # Errors
	///
	/// Returns [`crate::BundleError::Pattern`] if a pattern is not a valid glob.
	pub fn with_source<I, P>(source: S, patterns: I) -> BundleResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<str>,
	{
		let mut sources = Vec::new();
		let mut pattern_count = 0usize;
		for pattern in patterns {
			pattern_count += 1;
			sources.extend(source.resolve(pattern.as_ref())?);
		}

		if sources.is_empty() {
			tracing::warn!(patterns = pattern_count, "Bundle patterns matched no files");
		} else {
			tracing::info!(
				patterns = pattern_count,
				sources = sources.len(),
				"Resolved bundle sources"
			);
		}

		Ok(Self {
			source,
			sources,
			content_type: DEFAULT_CONTENT_TYPE.to_string(),
			max_age: ONE_YEAR_IN_SECONDS,
			current: RwLock::new(None),
			rebuild_lock: Mutex::new(()),
			counters: Counters::default(),
		})
	}

	/// Sets the `Content-Type` of 200 and 304 responses.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();
		self
	}

	/// Sets the `max-age` granted to requests carrying the fingerprint.
	pub fn with_max_age(mut self, seconds: u64) -> Self {
		self.max_age = seconds;
		self
	}

	/// Resolved source files, in concatenation order.
	pub fn sources(&self) -> &[PathBuf] {
		&self.sources
	}

	/// Returns true if the patterns matched no files.
	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}

	/// Content type of bundle responses.
	pub fn content_type(&self) -> &str {
		&self.content_type
	}

	/// Currently installed artifact, without checking freshness.
	pub fn current(&self) -> Option<Arc<Artifact>> {
		self.current.read().clone()
	}

	/// Snapshot of request and rebuild counters.
	pub fn statistics(&self) -> BundleStatistics {
		self.counters.snapshot()
	}

	/// Answers a request for the bundle.
	///
	/// Rebuilds the artifact first if it is missing or stale, then returns
	/// 304 when `If-Modified-Since` equals `Last-Modified` exactly or
	/// `If-None-Match` equals the ETag exactly, and 200 otherwise. A server
	/// with no sources always answers 404.
	///
	/// # Errors
	///
	/// Returns [`crate::BundleError::Io`] if a source cannot be read.
	pub fn handle(&self, request: &BundleRequest) -> BundleResult<BundleResponse> {
		self.counters.record_request();

		if self.sources.is_empty() {
			self.counters.record_not_found();
			return Ok(BundleResponse::not_found());
		}

		let artifact = self.fresh_artifact()?;
		let headers = self.headers(&artifact, request);

		if Self::is_not_modified(&artifact, request) {
			self.counters.record_not_modified();
			let mut response = BundleResponse::new(StatusCode::NOT_MODIFIED);
			response.headers = headers;
			return Ok(response);
		}

		let mut response = BundleResponse::new(StatusCode::OK);
		response.headers = headers;
		response.body = artifact.content().clone();
		Ok(response)
	}

	/// Returns the installed artifact, rebuilding it if needed.
	///
	/// Only one rebuild runs at a time. Callers that waited on the lock
	/// re-check freshness before building again.
	fn fresh_artifact(&self) -> BundleResult<Arc<Artifact>> {
		if let Some(artifact) = self.current()
			&& !artifact.is_stale(&self.source)?
		{
			tracing::trace!(etag = %artifact.fingerprint(), "Serving cached bundle");
			return Ok(artifact);
		}

		let _guard = self.rebuild_lock.lock();

		if let Some(artifact) = self.current()
			&& !artifact.is_stale(&self.source)?
		{
			return Ok(artifact);
		}

		let started = Instant::now();
		let artifact = Arc::new(Artifact::build(&self.source, &self.sources)?);
		self.counters.record_rebuild();
		tracing::debug!(
			sources = self.sources.len(),
			bytes = artifact.len(),
			etag = %artifact.fingerprint(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Rebuilt bundle"
		);

		*self.current.write() = Some(Arc::clone(&artifact));
		Ok(artifact)
	}

	fn is_not_modified(artifact: &Artifact, request: &BundleRequest) -> bool {
		let modified_since_matches = request
			.if_modified_since
			.as_deref()
			.is_some_and(|value| value == artifact.last_modified());
		let etag_matches = request
			.if_none_match
			.as_deref()
			.is_some_and(|value| value == artifact.fingerprint().etag());

		modified_since_matches || etag_matches
	}

	fn headers(
		&self,
		artifact: &Artifact,
		request: &BundleRequest,
	) -> Vec<(http::HeaderName, String)> {
		let mut cache_control = BASE_CACHE_CONTROL.to_string();
		if request
			.query
			.as_deref()
			.is_some_and(|query| artifact.fingerprint().matches_token(query))
		{
			cache_control.push_str(&format!(", max-age={}", self.max_age));
		}

		vec![
			(CONTENT_TYPE, self.content_type.clone()),
			(CONTENT_LENGTH, artifact.len().to_string()),
			(CACHE_CONTROL, cache_control),
			(LAST_MODIFIED, artifact.last_modified().to_string()),
			(ETAG, artifact.fingerprint().etag()),
		]
	}
}

impl<S: AssetSource> std::fmt::Debug for BundleServer<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BundleServer")
			.field("sources", &self.sources)
			.field("content_type", &self.content_type)
			.field("max_age", &self.max_age)
			.finish_non_exhaustive()
	}
}
