//! Link configuration: endpoint, token store, refresh shaping, and credential placement.

pub mod builder;

pub use builder::LinkConfigBuilder;

// self
use crate::{
	_prelude::*,
	clock::Clock,
	controller::RefreshListener,
	graphql::Headers,
	http::JsonHttpClient,
	request::{AuthScheme, RefreshRequest},
	store::TokenStore,
	transport::TokenPaths,
};

/// Everything a [`TokenController`](crate::controller::TokenController) needs to run.
///
/// Construct through [`LinkConfig::builder`], which validates the combination and fills in
/// the reqwest transport and system clock defaults.
#[derive(Clone)]
pub struct LinkConfig {
	/// Endpoint refresh calls are posted to.
	pub api_url: Url,
	/// Persistent storage consulted when the cache is empty.
	pub store: Arc<dyn TokenStore>,
	/// Shape of the refresh request body.
	pub refresh_request: RefreshRequest,
	/// Headers sent with refresh calls; defaults to a JSON content type.
	pub fetch_headers: Option<Headers>,
	/// Receives every refresh outcome and decides whether rotated tokens are kept.
	pub listener: Arc<dyn RefreshListener>,
	/// Where the access token is placed on outgoing requests.
	pub auth_scheme: AuthScheme,
	/// Where rotated tokens live in the refresh response.
	pub token_paths: TokenPaths,
	/// HTTP client used for refresh calls.
	pub http_client: Arc<dyn JsonHttpClient>,
	/// Clock expiry checks are evaluated against.
	pub clock: Arc<dyn Clock>,
	/// Emits one debug event per stage decision (requires the `tracing` feature).
	pub debug_mode: bool,
}
impl LinkConfig {
	/// Returns a builder targeting `api_url`.
	pub fn builder(api_url: Url) -> LinkConfigBuilder {
		LinkConfigBuilder::new(api_url)
	}
}
impl Debug for LinkConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkConfig")
			.field("api_url", &self.api_url.as_str())
			.field("refresh_request", &self.refresh_request)
			.field("fetch_headers_set", &self.fetch_headers.is_some())
			.field("auth_scheme", &self.auth_scheme)
			.field("token_paths", &self.token_paths)
			.field("debug_mode", &self.debug_mode)
			.finish()
	}
}
