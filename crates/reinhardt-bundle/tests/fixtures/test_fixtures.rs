//! Specialized test fixtures for reinhardt-bundle
//!
//! Every file is written with a fixed modification time so that
//! `Last-Modified` values are deterministic.

use reinhardt_bundle::{AssetSource, BundleResult, FileSystemSource};
use rstest::fixture;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Modification time given to every fixture file.
pub const BASE_MTIME: Duration = Duration::from_secs(1_650_000_000);

/// Temporary source tree
pub struct SourceTree {
	inner: TempDir,
}

impl SourceTree {
	pub fn new() -> Self {
		Self {
			inner: TempDir::new().unwrap(),
		}
	}

	pub fn root(&self) -> &Path {
		self.inner.path()
	}

	pub fn path(&self, relative: &str) -> PathBuf {
		self.inner.path().join(relative)
	}

	/// Absolute glob pattern for `relative`
	pub fn pattern(&self, relative: &str) -> String {
		format!("{}/{}", self.inner.path().display(), relative)
	}

	/// Writes `content` with the base modification time
	pub fn write(&self, relative: &str, content: &str) -> PathBuf {
		let path = self.path(relative);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(&path, content).unwrap();
		self.set_mtime(relative, SystemTime::UNIX_EPOCH + BASE_MTIME);
		path
	}

	pub fn set_mtime(&self, relative: &str, mtime: SystemTime) {
		File::options()
			.write(true)
			.open(self.path(relative))
			.unwrap()
			.set_modified(mtime)
			.unwrap();
	}

	/// Moves the modification time `seconds` past the base time
	pub fn touch(&self, relative: &str, seconds: u64) -> SystemTime {
		let mtime = SystemTime::UNIX_EPOCH + BASE_MTIME + Duration::from_secs(seconds);
		self.set_mtime(relative, mtime);
		mtime
	}

	pub fn remove(&self, relative: &str) {
		fs::remove_file(self.path(relative)).unwrap();
	}
}

/// Two sources whose bundle is `"var bar;\n\nvar foo;"`
#[fixture]
pub fn pair_tree() -> SourceTree {
	let tree = SourceTree::new();
	tree.write("a.js", "var bar;");
	tree.write("b.js", "var foo;");
	tree
}

/// Application scripts, `bar.js` ending in a newline
#[fixture]
pub fn javascripts_tree() -> SourceTree {
	let tree = SourceTree::new();
	tree.write("javascripts/bar.js", "var bar;\n");
	tree.write("javascripts/foo.js", "var foo;");
	tree
}

/// Application scripts plus two plugins
#[fixture]
pub fn plugin_tree(javascripts_tree: SourceTree) -> SourceTree {
	let tree = javascripts_tree;
	tree.write("plugins/bar/javascripts/bar.js", "var bar_plugin;");
	tree.write("plugins/foo/javascripts/foo.js", "var foo_plugin;");
	tree
}

/// File system source that counts reads
#[derive(Default)]
pub struct CountingSource {
	reads: AtomicUsize,
	delay: Option<Duration>,
}

impl CountingSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sleeps for `delay` on every read to widen race windows
	pub fn with_delay(delay: Duration) -> Self {
		Self {
			reads: AtomicUsize::new(0),
			delay: Some(delay),
		}
	}

	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

impl AssetSource for CountingSource {
	fn resolve(&self, pattern: &str) -> BundleResult<Vec<PathBuf>> {
		FileSystemSource.resolve(pattern)
	}

	fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		if let Some(delay) = self.delay {
			std::thread::sleep(delay);
		}
		FileSystemSource.read(path)
	}

	fn modified(&self, path: &Path) -> io::Result<SystemTime> {
		FileSystemSource.modified(path)
	}
}
