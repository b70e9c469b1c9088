// self
use crate::obs::RefreshResult;

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(outcome: RefreshResult) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("graphql_token_link_refresh_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
