//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Storage backend that keeps a single pair in-process and counts reads.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	pair: Arc<RwLock<TokenPair>>,
	failure: Arc<RwLock<Option<StoreError>>>,
	loads: Arc<AtomicU64>,
}
impl MemoryStore {
	/// Creates a store seeded with `pair`.
	pub fn with_pair(pair: TokenPair) -> Self {
		let store = Self::default();

		store.save(pair);

		store
	}

	/// Replaces the stored pair.
	pub fn save(&self, pair: TokenPair) {
		*self.pair.write() = pair;
	}

	/// Returns a copy of the stored pair.
	pub fn pair(&self) -> TokenPair {
		self.pair.read().clone()
	}

	/// Makes every subsequent load fail with `error`; `None` restores normal reads.
	pub fn fail_with(&self, error: Option<StoreError>) {
		*self.failure.write() = error;
	}

	/// Number of times [`TokenStore::load`] was called.
	pub fn loads(&self) -> u64 {
		self.loads.load(Ordering::SeqCst)
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, TokenPair> {
		self.loads.fetch_add(1, Ordering::SeqCst);

		let pair = self.pair.clone();
		let failure = self.failure.read().clone();

		Box::pin(async move {
			match failure {
				Some(err) => Err(err),
				None => Ok(pair.read().clone()),
			}
		})
	}
}
