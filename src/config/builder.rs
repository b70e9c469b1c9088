//! Validating builder for [`LinkConfig`].

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::LinkConfig,
	controller::{AcceptAll, RefreshListener},
	error::ConfigError,
	graphql::Headers,
	http::JsonHttpClient,
	request::{AuthScheme, BodyTemplate, RefreshRequest, VariablesProvider},
	store::TokenStore,
	transport::TokenPaths,
};

/// Builder for [`LinkConfig`] values.
pub struct LinkConfigBuilder {
	/// Endpoint refresh calls are posted to.
	pub api_url: Url,
	/// Token store consulted when the cache is empty.
	pub store: Option<Arc<dyn TokenStore>>,
	/// Refresh body shape.
	pub refresh_request: Option<RefreshRequest>,
	/// Headers sent with refresh calls.
	pub fetch_headers: Option<Headers>,
	/// Refresh outcome listener.
	pub listener: Option<Arc<dyn RefreshListener>>,
	/// Credential placement on outgoing requests.
	pub auth_scheme: AuthScheme,
	/// Token locations in refresh responses.
	pub token_paths: TokenPaths,
	/// HTTP client override.
	pub http_client: Option<Arc<dyn JsonHttpClient>>,
	/// Clock override.
	pub clock: Option<Arc<dyn Clock>>,
	/// Per-stage debug events.
	pub debug_mode: bool,
}
impl LinkConfigBuilder {
	/// Creates a builder targeting `api_url`.
	pub fn new(api_url: Url) -> Self {
		Self {
			api_url,
			store: None,
			refresh_request: None,
			fetch_headers: None,
			listener: None,
			auth_scheme: AuthScheme::default(),
			token_paths: TokenPaths::default(),
			http_client: None,
			clock: None,
			debug_mode: false,
		}
	}

	/// Sets the token store.
	pub fn store(mut self, store: impl 'static + TokenStore) -> Self {
		self.store = Some(Arc::new(store));

		self
	}

	/// Sets an already shared token store.
	pub fn shared_store(mut self, store: Arc<dyn TokenStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Shapes refresh calls as `{ "query": query, "variables": { "refreshToken": .. } }`.
	pub fn refresh_query(mut self, query: impl Into<String>) -> Self {
		self.refresh_request = Some(RefreshRequest::query(query));

		self
	}

	/// Adds extra refresh variables to a query shape set through [`Self::refresh_query`].
	pub fn refresh_variables(mut self, provider: impl 'static + VariablesProvider) -> Self {
		self.refresh_request = self.refresh_request.map(|request| request.with_variables(provider));

		self
	}

	/// Shapes refresh calls with a caller-built body template.
	pub fn refresh_body(mut self, template: impl 'static + BodyTemplate) -> Self {
		self.refresh_request = Some(RefreshRequest::template(template));

		self
	}

	/// Sets the refresh shape directly.
	pub fn refresh_request(mut self, request: RefreshRequest) -> Self {
		self.refresh_request = Some(request);

		self
	}

	/// Overrides the headers sent with refresh calls.
	pub fn fetch_headers(mut self, headers: Headers) -> Self {
		self.fetch_headers = Some(headers);

		self
	}

	/// Registers the refresh outcome listener.
	pub fn listener(mut self, listener: impl 'static + RefreshListener) -> Self {
		self.listener = Some(Arc::new(listener));

		self
	}

	/// Overrides where the access token is placed.
	pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
		self.auth_scheme = scheme;

		self
	}

	/// Overrides where rotated tokens are read from.
	pub fn token_paths(mut self, paths: TokenPaths) -> Self {
		self.token_paths = paths;

		self
	}

	/// Overrides the HTTP client used for refresh calls.
	pub fn http_client(mut self, client: impl JsonHttpClient) -> Self {
		self.http_client = Some(Arc::new(client));

		self
	}

	/// Overrides the clock expiry checks use.
	pub fn clock(mut self, clock: impl 'static + Clock) -> Self {
		self.clock = Some(Arc::new(clock));

		self
	}

	/// Toggles per-stage debug events.
	pub fn debug_mode(mut self, enabled: bool) -> Self {
		self.debug_mode = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<LinkConfig, ConfigError> {
		let store = self.store.ok_or(ConfigError::MissingStore)?;
		let refresh_request = self.refresh_request.ok_or(ConfigError::MissingRefreshRequest)?;

		if matches!(&self.auth_scheme, AuthScheme::Header(name) if name.trim().is_empty()) {
			return Err(ConfigError::EmptyHeaderName);
		}

		let http_client = match self.http_client {
			Some(client) => client,
			None => default_http_client()?,
		};

		Ok(LinkConfig {
			api_url: self.api_url,
			store,
			refresh_request,
			fetch_headers: self.fetch_headers,
			listener: self.listener.unwrap_or_else(|| Arc::new(AcceptAll)),
			auth_scheme: self.auth_scheme,
			token_paths: self.token_paths,
			http_client,
			clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
			debug_mode: self.debug_mode,
		})
	}
}
impl Debug for LinkConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkConfigBuilder")
			.field("api_url", &self.api_url.as_str())
			.field("store_set", &self.store.is_some())
			.field("refresh_request", &self.refresh_request)
			.field("auth_scheme", &self.auth_scheme)
			.field("debug_mode", &self.debug_mode)
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_http_client() -> Result<Arc<dyn JsonHttpClient>, ConfigError> {
	let client = ReqwestClient::builder().build()?;

	Ok(Arc::new(ReqwestHttpClient::with_client(client)))
}

#[cfg(not(feature = "reqwest"))]
fn default_http_client() -> Result<Arc<dyn JsonHttpClient>, ConfigError> {
	Err(ConfigError::MissingHttpClient)
}
