//! Access to bundle source files
//!
//! [`AssetSource`] is the seam between the bundling engine and the file
//! system: glob resolution, content reads and modification times.

use crate::error::{BundleError, BundleResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Read access to the files a bundle is built from.
pub trait AssetSource: Send + Sync {
	/// Resolves a glob pattern to matching files, in match order.
	///
	/// # Errors
	///
	/// Returns [`BundleError::Pattern`] if the pattern cannot be parsed.
	fn resolve(&self, pattern: &str) -> BundleResult<Vec<PathBuf>>;

	/// Reads the full contents of a file.
	fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

	/// Reads the modification time of a file.
	fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`AssetSource`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSource;

impl FileSystemSource {
	/// Creates a new file system source.
	pub fn new() -> Self {
		Self
	}
}

impl AssetSource for FileSystemSource {
	fn resolve(&self, pattern: &str) -> BundleResult<Vec<PathBuf>> {
		let entries = glob::glob(pattern).map_err(|e| BundleError::Pattern {
			pattern: pattern.to_string(),
			message: e.to_string(),
		})?;

		let mut paths = Vec::new();
		for entry in entries {
			match entry {
				Ok(path) if path.is_file() => paths.push(path),
				Ok(_) => {}
				Err(e) => {
					// Unreadable directories are skipped, same as a shell glob
					tracing::warn!(path = %e.path().display(), "Skipping unreadable path: {}", e);
				}
			}
		}

		Ok(paths)
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		fs::read(path)
	}

	fn modified(&self, path: &Path) -> io::Result<SystemTime> {
		fs::metadata(path)?.modified()
	}
}

impl<T: AssetSource + ?Sized> AssetSource for std::sync::Arc<T> {
	fn resolve(&self, pattern: &str) -> BundleResult<Vec<PathBuf>> {
		(**self).resolve(pattern)
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		(**self).read(path)
	}

	fn modified(&self, path: &Path) -> io::Result<SystemTime> {
		(**self).modified(path)
	}
}

/// Latest modification time across `paths`.
///
/// Returns `None` when `paths` is empty.
pub(crate) fn latest_modification<S: AssetSource + ?Sized>(
	source: &S,
	paths: &[PathBuf],
) -> BundleResult<Option<SystemTime>> {
	let mut latest: Option<SystemTime> = None;
	for path in paths {
		let modified = source
			.modified(path)
			.map_err(|e| BundleError::io(path, e))?;
		latest = Some(latest.map_or(modified, |current| current.max(modified)));
	}
	Ok(latest)
}
