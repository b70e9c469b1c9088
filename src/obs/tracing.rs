// self
use crate::{_prelude::*, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by controller stages.
#[derive(Clone, Debug)]
pub struct LinkSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl LinkSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("graphql_token_link.stage", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a per-stage debug event when `debug_mode` is on.
pub(crate) fn trace_stage(debug_mode: bool, stage: Stage, skipped: bool) {
	#[cfg(feature = "tracing")]
	{
		if debug_mode {
			tracing::debug!(stage = stage.as_str(), skipped, "token link stage");
		}
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (debug_mode, stage, skipped);
	}
}

/// Reports a failure the controller absorbed instead of propagating.
pub(crate) fn absorbed_failure(stage: Stage, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage = stage.as_str(), error = %error, "token link absorbed a failure");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}

/// Reports a due refresh that was abandoned before any network call.
pub(crate) fn skipped_refresh(reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(reason, "token refresh skipped");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}

/// Reports a refresh result dropped because the cache was reset while it was in flight.
pub(crate) fn discarded_refresh() {
	#[cfg(feature = "tracing")]
	{
		tracing::info!("token refresh result discarded after reset");
	}
}
