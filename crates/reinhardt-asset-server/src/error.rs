//! Error types for the asset server.

use reinhardt_bundle::BundleError;
use thiserror::Error;

/// Errors raised while configuring or running the asset server.
#[derive(Debug, Error)]
pub enum ServerError {
	/// Settings are present but invalid.
	#[error("Settings error: {0}")]
	Settings(String),

	/// Settings file is not valid TOML for [`crate::AssetSettings`].
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// I/O failure (settings file, socket).
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Bundle construction or serving failed.
	#[error("Bundle error: {0}")]
	Bundle(#[from] BundleError),

	/// Connection-level HTTP failure.
	#[error("HTTP error: {0}")]
	Hyper(#[from] hyper::Error),
}

/// Result type alias for asset server operations.
pub type ServerResult<T> = Result<T, ServerError>;
