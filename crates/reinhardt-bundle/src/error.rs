//! Error types for bundle construction and serving.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, building or serving a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
	/// A source file could not be read or stat'ed.
	#[error("IO error on {}: {source}", path.display())]
	Io {
		/// Path of the offending source file.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// A source pattern is not a valid glob.
	#[error("Invalid source pattern {pattern:?}: {message}")]
	Pattern {
		/// The pattern as supplied by the caller.
		pattern: String,
		/// Parser message.
		message: String,
	},

	/// A response header value could not be encoded.
	#[error("Invalid header value: {0}")]
	InvalidHeader(String),
}

impl BundleError {
	/// Wraps an I/O error together with the path it occurred on.
	pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

/// Result type alias for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;
