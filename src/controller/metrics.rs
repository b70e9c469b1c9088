// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for store reads and refresh rotations.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	skipped: AtomicU64,
	store_reads: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refresh calls sent to the transport.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes whose tokens were cached.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that cleared the cache.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes abandoned before any network call.
	pub fn skips(&self) -> u64 {
		self.skipped.load(Ordering::Relaxed)
	}

	/// Returns the number of token store reads.
	pub fn store_reads(&self) -> u64 {
		self.store_reads.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_skip(&self) {
		self.skipped.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_store_read(&self) {
		self.store_reads.fetch_add(1, Ordering::Relaxed);
	}
}
