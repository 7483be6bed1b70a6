//! Immutable bundle snapshots

use crate::error::{BundleError, BundleResult};
use crate::fingerprint::Fingerprint;
use crate::source::{AssetSource, latest_modification};
use bytes::Bytes;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Separator placed between consecutive source files.
pub const SOURCE_SEPARATOR: &[u8] = b"\n\n";

/// 9999-12-31T23:59:59Z, the last instant an HTTP-date can express.
const LATEST_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// Concatenated, fingerprinted snapshot of a bundle's sources.
///
/// An artifact never changes after [`Artifact::build`] returns. A newer
/// snapshot replaces it instead.
#[derive(Debug, Clone)]
pub struct Artifact {
	sources: Vec<PathBuf>,
	content: Bytes,
	fingerprint: Fingerprint,
	built_at: SystemTime,
	last_modified: String,
}

impl Artifact {
	/// Reads every source in order and concatenates them.
	///
	/// `built_at` is the latest modification time among `sources` as seen
	/// before reading, not the wall-clock build time.
	///
	/// # Errors
	///
	/// Returns [`BundleError::Io`] if any source cannot be stat'ed or read.
	/// No partial artifact is produced.
	///
	/// # Example
	///
	/// ```rust,ignore
	/// use reinhardt_bundle::{Artifact, FileSystemSource};
	/// use std::path::PathBuf;
	///
	/// let sources = vec![PathBuf::from("a.js"), PathBuf::from("b.js")];
	/// let artifact = Artifact::build(&FileSystemSource, &sources)?;
	/// println!("{}", artifact.fingerprint());
	/// ```
	pub fn build<S: AssetSource + ?Sized>(source: &S, sources: &[PathBuf]) -> BundleResult<Self> {
		let built_at = latest_modification(source, sources)?.unwrap_or(SystemTime::UNIX_EPOCH);

		let mut content = Vec::new();
		for (index, path) in sources.iter().enumerate() {
			if index > 0 {
				content.extend_from_slice(SOURCE_SEPARATOR);
			}
			let bytes = source.read(path).map_err(|e| BundleError::io(path, e))?;
			content.extend_from_slice(&bytes);
		}

		let fingerprint = Fingerprint::compute(&content);

		Ok(Self {
			sources: sources.to_vec(),
			content: Bytes::from(content),
			fingerprint,
			built_at,
			last_modified: http_date(built_at),
		})
	}

	/// Returns true if any source has been modified after `built_at`.
	///
	/// Every call stats the sources again; nothing is memoized.
	///
	/// # Errors
	///
	/// Returns [`BundleError::Io`] if a source can no longer be stat'ed.
	pub fn is_stale<S: AssetSource + ?Sized>(&self, source: &S) -> BundleResult<bool> {
		let latest = latest_modification(source, &self.sources)?;
		Ok(latest.is_some_and(|modified| modified > self.built_at))
	}

	/// Source files in concatenation order.
	pub fn sources(&self) -> &[PathBuf] {
		&self.sources
	}

	/// Concatenated bundle bytes.
	pub fn content(&self) -> &Bytes {
		&self.content
	}

	/// Byte length of the content.
	pub fn len(&self) -> usize {
		self.content.len()
	}

	/// Returns true if the content is empty.
	pub fn is_empty(&self) -> bool {
		self.content.is_empty()
	}

	/// Content fingerprint.
	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	/// Latest source modification time at build.
	pub fn built_at(&self) -> SystemTime {
		self.built_at
	}

	/// `built_at` as an HTTP-date, the value of `Last-Modified`.
	pub fn last_modified(&self) -> &str {
		&self.last_modified
	}
}

/// Formats `time` as an HTTP-date, clamped to 1970..=9999.
///
/// Only the formatted value is clamped. `built_at` keeps the real time.
fn http_date(time: SystemTime) -> String {
	let latest = SystemTime::UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECS);
	httpdate::fmt_http_date(time.clamp(SystemTime::UNIX_EPOCH, latest))
}
