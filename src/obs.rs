//! Optional observability helpers for link stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `graphql_token_link.stage` with a `stage` field, warn
//!   events for absorbed store/refresh failures, and (with `debug_mode`) one debug event per
//!   stage decision.
//! - Enable `metrics` to increment the `graphql_token_link_refresh_total` counter for every
//!   refresh attempt/success/failure/skip, labeled by `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Controller stages observed by spans and debug events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Token store read into an empty cache.
	Populate,
	/// Access-token expiry evaluation.
	CheckExpiry,
	/// Credential attachment.
	Authorize,
	/// Refresh rotation.
	Refresh,
	/// Unauthenticated-response interception.
	Intercept,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Populate => "populate",
			Stage::CheckExpiry => "check_expiry",
			Stage::Authorize => "authorize",
			Stage::Refresh => "refresh",
			Stage::Intercept => "intercept",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshResult {
	/// A refresh call is about to be sent.
	Attempt,
	/// Rotated tokens were cached.
	Success,
	/// The cache was cleared.
	Failure,
	/// The refresh was abandoned before any network call.
	Skipped,
}
impl RefreshResult {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshResult::Attempt => "attempt",
			RefreshResult::Success => "success",
			RefreshResult::Failure => "failure",
			RefreshResult::Skipped => "skipped",
		}
	}
}
impl Display for RefreshResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
