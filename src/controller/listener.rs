// self
use crate::{_prelude::*, transport::RefreshOutcome};

/// Boxed future returned by [`RefreshListener::on_refresh_complete`].
pub type ListenerFuture<'a> = Pin<Box<dyn Future<Output = RefreshVerdict> + 'a + Send>>;

/// What the controller does with a successful refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshVerdict {
	/// Cache the rotated tokens.
	#[default]
	Accept,
	/// Drop the rotated tokens and clear the cache.
	Reject,
}

/// Observes every refresh exchange before its result is applied.
///
/// Typical listeners persist rotated tokens back into the application's store or log the
/// user out when the refresh was rejected. The verdict is ignored for failed outcomes, which
/// always clear the cache.
pub trait RefreshListener
where
	Self: Send + Sync,
{
	/// Called once per refresh exchange with its outcome.
	fn on_refresh_complete<'a>(&'a self, outcome: &'a RefreshOutcome) -> ListenerFuture<'a>;
}

/// Listener that accepts every rotation and does nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;
impl RefreshListener for AcceptAll {
	fn on_refresh_complete<'a>(&'a self, _outcome: &'a RefreshOutcome) -> ListenerFuture<'a> {
		Box::pin(async { RefreshVerdict::Accept })
	}
}
