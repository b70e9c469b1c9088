//! Request shaping: refresh bodies, refresh headers, and credential placement.

// self
use crate::{_prelude::*, error::RefreshError, graphql::Headers};

/// Variable name the refresh token is injected under.
pub const REFRESH_TOKEN_VARIABLE: &str = "refreshToken";

/// Boxed future returned by [`BodyTemplate::body`] and [`VariablesProvider::variables`].
pub type TemplateFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Produces the JSON body of a refresh request before the refresh token is injected.
pub trait BodyTemplate
where
	Self: Send + Sync,
{
	/// Returns a fresh body; it is consumed by exactly one refresh call.
	fn body(&self) -> TemplateFuture<'_, Value>;
}
impl BodyTemplate for Value {
	fn body(&self) -> TemplateFuture<'_, Value> {
		let body = self.clone();

		Box::pin(async move { body })
	}
}

/// Supplies extra variables sent alongside the refresh token (device id, client version).
pub trait VariablesProvider
where
	Self: Send + Sync,
{
	/// Returns the variables for the next refresh call.
	fn variables(&self) -> TemplateFuture<'_, Map<String, Value>>;
}

/// How the refresh request body is shaped.
#[derive(Clone)]
pub enum RefreshRequest {
	/// A GraphQL document plus optional extra variables; expands to
	/// `{ "query": .., "variables": { ..extra, "refreshToken": .. } }`.
	Query {
		/// Refresh mutation document.
		query: String,
		/// Optional provider of extra variables.
		variables: Option<Arc<dyn VariablesProvider>>,
	},
	/// A caller-built body; the refresh token lands in `variables.refreshToken`.
	Body(Arc<dyn BodyTemplate>),
}
impl RefreshRequest {
	/// Shapes refreshes as the provided GraphQL document.
	pub fn query(query: impl Into<String>) -> Self {
		Self::Query { query: query.into(), variables: None }
	}

	/// Shapes refreshes with a caller-built body.
	pub fn template(template: impl 'static + BodyTemplate) -> Self {
		Self::Body(Arc::new(template))
	}

	/// Attaches an extra-variables provider to a [`RefreshRequest::Query`]; no effect on
	/// [`RefreshRequest::Body`], whose template owns its variables.
	pub fn with_variables(self, provider: impl 'static + VariablesProvider) -> Self {
		match self {
			Self::Query { query, .. } => Self::Query { query, variables: Some(Arc::new(provider)) },
			body => body,
		}
	}
}
impl BodyTemplate for RefreshRequest {
	fn body(&self) -> TemplateFuture<'_, Value> {
		Box::pin(async move {
			match self {
				Self::Query { query, variables } => {
					let variables = match variables {
						Some(provider) => provider.variables().await,
						None => Map::new(),
					};
					let mut body = Map::new();

					body.insert("query".into(), Value::String(query.clone()));
					body.insert("variables".into(), Value::Object(variables));

					Value::Object(body)
				},
				Self::Body(template) => template.body().await,
			}
		})
	}
}
impl Debug for RefreshRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Query { query, variables } => f
				.debug_struct("RefreshRequest::Query")
				.field("query", query)
				.field("variables_set", &variables.is_some())
				.finish(),
			Self::Body(_) => f.write_str("RefreshRequest::Body(..)"),
		}
	}
}

/// Builds a refresh body from `template` with `refresh_token` injected into `variables`.
///
/// `variables` is created when absent; every other field the template produced is kept.
pub async fn build_refresh_body(
	template: &(impl ?Sized + BodyTemplate),
	refresh_token: &str,
) -> Result<Value, RefreshError> {
	let Value::Object(mut body) = template.body().await else {
		return Err(RefreshError::InvalidBody { reason: "body must be a JSON object" });
	};
	let variables = body.entry("variables").or_insert_with(|| Value::Object(Map::new()));

	if variables.is_null() {
		*variables = Value::Object(Map::new());
	}

	let Value::Object(variables) = variables else {
		return Err(RefreshError::InvalidBody { reason: "variables must be a JSON object" });
	};

	variables.insert(REFRESH_TOKEN_VARIABLE.into(), Value::String(refresh_token.into()));

	Ok(Value::Object(body))
}

/// Returns `headers` unchanged when it has entries, otherwise a JSON content-type default.
pub fn select_headers(headers: Option<&Headers>) -> Headers {
	match headers {
		Some(headers) if !headers.is_empty() => headers.clone(),
		_ => Headers::from([("Content-Type".into(), "application/json".into())]),
	}
}

/// Where the access token is placed on outgoing requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthScheme {
	/// `authorization: Bearer <token>`.
	#[default]
	Bearer,
	/// `<name>: <token>`, e.g. `x-token`.
	Header(String),
}
impl AuthScheme {
	const AUTHORIZATION: &'static str = "authorization";
	const BEARER_PREFIX: &'static str = "Bearer ";

	/// Header name the credential is stored under.
	pub fn header_name(&self) -> &str {
		match self {
			Self::Bearer => Self::AUTHORIZATION,
			Self::Header(name) => name,
		}
	}

	/// Returns a copy of `headers` with the credential set, replacing any earlier value
	/// under the same (case-insensitive) name.
	pub fn attach_credential(&self, headers: &Headers, token: &str) -> Headers {
		let mut merged = self.strip_credential(headers);
		let value = match self {
			Self::Bearer => format!("{}{token}", Self::BEARER_PREFIX),
			Self::Header(_) => token.to_owned(),
		};

		merged.insert(self.header_name().to_owned(), value);

		merged
	}

	/// Returns a copy of `headers` without the credential header.
	pub fn strip_credential(&self, headers: &Headers) -> Headers {
		let name = self.header_name();

		headers
			.iter()
			.filter(|(key, _)| !key.eq_ignore_ascii_case(name))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect()
	}

	/// Extracts the token presented in `headers`, if any.
	pub fn presented_credential<'h>(&self, headers: &'h Headers) -> Option<&'h str> {
		let name = self.header_name();
		let value = headers
			.iter()
			.find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))?;

		match self {
			Self::Bearer => value
				.get(..Self::BEARER_PREFIX.len())
				.filter(|prefix| prefix.eq_ignore_ascii_case(Self::BEARER_PREFIX))
				.map(|_| &value[Self::BEARER_PREFIX.len()..]),
			Self::Header(_) => Some(value),
		}
	}
}
