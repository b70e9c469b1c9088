//! Token-store contract consulted when the controller's cache is empty.
//!
//! Persistence belongs to the application: a store only has to hand back the last known
//! token pair. [`MemoryStore`] covers tests and demos.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenPair};

/// Boxed future returned by [`TokenStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Application-owned persistent storage for the last known token pair.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Loads the last known pair; an empty pair means the user is signed out.
	fn load(&self) -> StoreFuture<'_, TokenPair>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
