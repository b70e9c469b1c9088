//! Token cache and refresh controller.
//!
//! A [`TokenController`] owns the cached [`TokenPair`] for one configured client. Each
//! outgoing request goes through [`TokenController::prepare_auth`], which lazily reads the
//! token store, rotates a stale access token, and attaches whatever credential is still valid.
//!
//! Store reads and refresh rotations are coalesced: callers record the controller's epoch
//! before queueing on a single async lock, and a caller that finds the epoch moved while it
//! waited reuses the work that was just done instead of repeating it. Failures never leave
//! the controller; they clear the cache, reach the [`RefreshListener`], and get logged.

mod listener;
mod metrics;

pub use listener::*;
pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	config::LinkConfig,
	error::RefreshError,
	graphql::Headers,
	obs::{self, LinkSpan, RefreshResult, Stage},
	request,
	transport::TokenTransport,
};

/// What [`TokenController::refresh_if_stale`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshAttempt {
	/// The cached access token is still usable, or nothing is cached.
	NotNeeded,
	/// The transport returned new tokens and they were cached.
	Rotated,
	/// The refresh failed or was declined; the cache is now empty.
	Cleared,
	/// The refresh was abandoned before any network call; the cache is untouched.
	Skipped {
		/// Why the refresh could not run.
		reason: SkipReason,
	},
	/// Another caller rotated (or cleared) the cache while this one waited.
	Coalesced,
}

/// Why a due refresh was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
	/// No refresh token is cached.
	MissingRefreshToken,
	/// The cached refresh token's own `exp` claim has passed.
	RefreshTokenExpired,
}
impl SkipReason {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SkipReason::MissingRefreshToken => "missing_refresh_token",
			SkipReason::RefreshTokenExpired => "refresh_token_expired",
		}
	}
}
impl Display for SkipReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Default)]
struct TokenCache {
	pair: TokenPair,
	// Set when the server rejected the cached access token or an expiry check failed it.
	access_stale: bool,
}
impl TokenCache {
	fn refresh_due(&self, now: OffsetDateTime) -> bool {
		match &self.pair.access_token {
			Some(access) => self.access_stale || access.is_expired_at(now),
			None => self.pair.refresh_token.is_some(),
		}
	}

	fn usable_access(&self, now: OffsetDateTime) -> Option<&TokenSecret> {
		if self.access_stale {
			return None;
		}

		self.pair.access_token.as_ref().filter(|access| !access.is_expired_at(now))
	}
}

/// Owns the token cache of one configured client.
pub struct TokenController {
	config: LinkConfig,
	transport: TokenTransport,
	cache: Mutex<TokenCache>,
	flight: AsyncMutex<()>,
	epoch: AtomicU64,
	metrics: Arc<RefreshMetrics>,
}
impl TokenController {
	/// Creates a controller with an empty cache.
	pub fn new(config: LinkConfig) -> Self {
		let transport = TokenTransport::new(
			config.http_client.clone(),
			config.api_url.clone(),
			config.token_paths.clone(),
		);

		Self {
			config,
			transport,
			cache: Mutex::new(TokenCache::default()),
			flight: AsyncMutex::new(()),
			epoch: AtomicU64::new(0),
			metrics: Default::default(),
		}
	}

	/// Configuration the controller was built from.
	pub fn config(&self) -> &LinkConfig {
		&self.config
	}

	/// Shared store-read and refresh counters.
	pub fn metrics(&self) -> Arc<RefreshMetrics> {
		self.metrics.clone()
	}

	/// Returns a copy of the cached pair.
	pub fn snapshot(&self) -> TokenPair {
		self.cache.lock().pair.clone()
	}

	/// Runs populate, refresh, and attach in order.
	///
	/// Returns `headers` merged with the credential, or `None` when no usable access token
	/// is cached afterwards.
	pub async fn prepare_auth(&self, headers: &Headers) -> Option<Headers> {
		self.populate().await;
		self.refresh_if_stale().await;
		self.authorize(headers)
	}

	/// Reads the token store into an empty cache.
	///
	/// Concurrent callers share one store read. A non-empty cache is never overwritten.
	pub async fn populate(&self) {
		let Some(seen) = self.epoch_if(|cache| cache.pair.is_empty()) else {
			obs::trace_stage(self.config.debug_mode, Stage::Populate, true);

			return;
		};

		LinkSpan::new(Stage::Populate)
			.instrument(async {
				let _flight = self.flight.lock().await;

				if self.epoch.load(Ordering::Acquire) != seen {
					obs::trace_stage(self.config.debug_mode, Stage::Populate, true);

					return;
				}

				self.populate_locked().await;
			})
			.await
	}

	/// Marks the access token stale when its `exp` claim has passed.
	///
	/// Returns `true` when the cached access token is stale afterwards.
	pub fn check_expiry(&self) -> bool {
		let now = self.config.clock.now();
		let mut cache = self.cache.lock();
		let expired =
			cache.pair.access_token.as_ref().is_some_and(|access| access.is_expired_at(now));

		if expired {
			cache.access_stale = true;
		}

		let stale = cache.access_stale && cache.pair.access_token.is_some();

		drop(cache);
		obs::trace_stage(self.config.debug_mode, Stage::CheckExpiry, !stale);

		stale
	}

	/// Merges the cached credential into `headers` when a usable access token is cached.
	pub fn authorize(&self, headers: &Headers) -> Option<Headers> {
		let now = self.config.clock.now();
		let attached = self
			.cache
			.lock()
			.usable_access(now)
			.map(|access| self.config.auth_scheme.attach_credential(headers, access.expose()));

		obs::trace_stage(self.config.debug_mode, Stage::Authorize, attached.is_none());

		attached
	}

	/// Rotates the pair when the access token is expired, flagged, or missing.
	pub async fn refresh_if_stale(&self) -> RefreshAttempt {
		let now = self.config.clock.now();
		let Some(seen) = self.epoch_if(|cache| cache.refresh_due(now)) else {
			obs::trace_stage(self.config.debug_mode, Stage::Refresh, true);

			return RefreshAttempt::NotNeeded;
		};

		LinkSpan::new(Stage::Refresh)
			.instrument(async {
				let _flight = self.flight.lock().await;

				// A waiter only refreshes again if what it waited for left the cache stale.
				if self.epoch.load(Ordering::Acquire) != seen
					&& !self.cache.lock().refresh_due(self.config.clock.now())
				{
					obs::trace_stage(self.config.debug_mode, Stage::Refresh, true);

					return RefreshAttempt::Coalesced;
				}

				self.refresh_locked().await
			})
			.await
	}

	/// Flags the cached access token as rejected by the server.
	///
	/// `presented` is the credential the rejected request carried. When it no longer
	/// matches the cached token, someone already rotated and the call is ignored. Returns
	/// whether the flag was set.
	pub fn invalidate(&self, presented: Option<&str>) -> bool {
		let mut cache = self.cache.lock();
		let matches = match (cache.pair.access(), presented) {
			(Some(cached), Some(presented)) => cached == presented,
			(Some(_), None) => true,
			(None, _) => false,
		};

		if matches {
			cache.access_stale = true;
		}

		matches
	}

	/// Empties the cache; the next request reads the token store again.
	///
	/// A refresh already in flight when the reset lands drops its result instead of caching
	/// it.
	pub fn reset(&self) {
		let mut cache = self.cache.lock();

		*cache = TokenCache::default();

		self.epoch.fetch_add(1, Ordering::AcqRel);
	}

	// Reads the epoch under the same cache lock that every epoch bump holds, so a waiter
	// never observes a cleared cache with the old epoch.
	fn epoch_if(&self, due: impl FnOnce(&TokenCache) -> bool) -> Option<u64> {
		let cache = self.cache.lock();

		due(&cache).then(|| self.epoch.load(Ordering::Acquire))
	}

	// Replaces the cache unless a reset moved the epoch since `started`.
	fn commit(&self, started: u64, next: TokenCache) -> bool {
		let mut cache = self.cache.lock();

		if self.epoch.load(Ordering::Acquire) != started {
			return false;
		}

		*cache = next;

		self.epoch.fetch_add(1, Ordering::AcqRel);

		true
	}

	async fn populate_locked(&self) {
		self.metrics.record_store_read();
		obs::trace_stage(self.config.debug_mode, Stage::Populate, false);

		let started = self.epoch.load(Ordering::Acquire);
		let loaded = match self.config.store.load().await {
			Ok(pair) => TokenCache { pair: pair.normalized(), access_stale: false },
			Err(e) => {
				obs::absorbed_failure(Stage::Populate, &e);

				TokenCache::default()
			},
		};

		self.commit(started, loaded);
	}

	async fn refresh_locked(&self) -> RefreshAttempt {
		let now = self.config.clock.now();
		let (started, refresh_token) = {
			let cache = self.cache.lock();

			if !cache.refresh_due(now) {
				return RefreshAttempt::NotNeeded;
			}

			(self.epoch.load(Ordering::Acquire), cache.pair.refresh_token.clone())
		};
		let Some(refresh_token) = refresh_token else {
			return self.skip(SkipReason::MissingRefreshToken);
		};

		if refresh_token.is_expired_at(now) {
			return self.skip(SkipReason::RefreshTokenExpired);
		}

		self.metrics.record_attempt();
		obs::record_refresh_outcome(RefreshResult::Attempt);
		obs::trace_stage(self.config.debug_mode, Stage::Refresh, false);

		let outcome =
			match request::build_refresh_body(&self.config.refresh_request, refresh_token.expose())
				.await
			{
				Ok(body) => {
					let headers = request::select_headers(self.config.fetch_headers.as_ref());

					self.transport.refresh(&body, &headers).await
				},
				Err(e) => Err(e),
			};

		if self.epoch.load(Ordering::Acquire) != started {
			return self.discard();
		}

		let verdict = self.config.listener.on_refresh_complete(&outcome).await;

		match (outcome, verdict) {
			(Ok(tokens), RefreshVerdict::Accept) => {
				if !self.commit(started, TokenCache { pair: tokens.into(), access_stale: false }) {
					return self.discard();
				}

				self.metrics.record_success();
				obs::record_refresh_outcome(RefreshResult::Success);

				RefreshAttempt::Rotated
			},
			(outcome, _) => {
				let error = outcome.err().unwrap_or(RefreshError::Declined);

				self.commit(started, TokenCache::default());
				self.metrics.record_failure();
				obs::record_refresh_outcome(RefreshResult::Failure);
				obs::absorbed_failure(Stage::Refresh, &error);

				RefreshAttempt::Cleared
			},
		}
	}

	// The cache was reset mid-exchange; whatever the exchange produced is stale.
	fn discard(&self) -> RefreshAttempt {
		obs::discarded_refresh();

		RefreshAttempt::Coalesced
	}

	fn skip(&self, reason: SkipReason) -> RefreshAttempt {
		self.metrics.record_skip();
		obs::record_refresh_outcome(RefreshResult::Skipped);
		obs::skipped_refresh(reason.as_str());

		RefreshAttempt::Skipped { reason }
	}
}
impl Debug for TokenController {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenController")
			.field("config", &self.config)
			.field("transport", &self.transport)
			.field("pair", &self.cache.lock().pair)
			.field("epoch", &self.epoch.load(Ordering::Relaxed))
			.finish()
	}
}
