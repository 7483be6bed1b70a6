//! Bundle server statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a bundle server's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleStatistics {
	/// Requests handled, including 404s
	pub requests: u64,
	/// Artifacts built
	pub rebuilds: u64,
	/// 304 responses
	pub not_modified: u64,
	/// 404 responses
	pub not_found: u64,
}

impl BundleStatistics {
	/// Fraction of served requests answered with 304 (0.0 to 1.0).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_bundle::BundleStatistics;
	///
	/// let stats = BundleStatistics {
	///     requests: 4,
	///     rebuilds: 1,
	///     not_modified: 3,
	///     not_found: 0,
	/// };
	/// assert_eq!(stats.not_modified_rate(), 0.75);
	/// ```
	pub fn not_modified_rate(&self) -> f64 {
		if self.requests == 0 {
			0.0
		} else {
			self.not_modified as f64 / self.requests as f64
		}
	}
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
	requests: AtomicU64,
	rebuilds: AtomicU64,
	not_modified: AtomicU64,
	not_found: AtomicU64,
}

impl Counters {
	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rebuild(&self) {
		self.rebuilds.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_not_modified(&self) {
		self.not_modified.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_not_found(&self) {
		self.not_found.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn snapshot(&self) -> BundleStatistics {
		BundleStatistics {
			requests: self.requests.load(Ordering::Relaxed),
			rebuilds: self.rebuilds.load(Ordering::Relaxed),
			not_modified: self.not_modified.load(Ordering::Relaxed),
			not_found: self.not_found.load(Ordering::Relaxed),
		}
	}
}
