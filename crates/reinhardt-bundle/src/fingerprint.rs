//! Content fingerprints used as strong ETags and cache-busting tokens.

use md5::{Digest, Md5};
use std::fmt;

/// MD5 digest of a bundle's content, kept as lowercase hex.
///
/// The digest is a cache validator, not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
	/// Computes the fingerprint of `content`.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_bundle::Fingerprint;
	///
	/// let fingerprint = Fingerprint::compute(b"var bar;\n\nvar foo;");
	/// assert_eq!(fingerprint.hex(), "cf3279b0d6bfa4351cae1e7d085164cd");
	/// ```
	pub fn compute(content: &[u8]) -> Self {
		let mut hasher = Md5::new();
		hasher.update(content);
		Self(hex::encode(hasher.finalize()))
	}

	/// Unquoted hex digest, the form expected in a cache-busting query string.
	pub fn hex(&self) -> &str {
		&self.0
	}

	/// Quoted strong validator suitable for the `ETag` header.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_bundle::Fingerprint;
	///
	/// let fingerprint = Fingerprint::compute(b"");
	/// assert_eq!(fingerprint.etag(), "\"d41d8cd98f00b204e9800998ecf8427e\"");
	/// ```
	pub fn etag(&self) -> String {
		format!("\"{}\"", self.0)
	}

	/// Returns true if `token` is exactly the unquoted digest.
	pub fn matches_token(&self, token: &str) -> bool {
		self.0 == token
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "\"{}\"", self.0)
	}
}
