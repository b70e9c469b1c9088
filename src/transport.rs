//! Token transport: one refresh exchange against the GraphQL endpoint.
//!
//! [`TokenTransport::refresh`] never fails past its boundary. Connection failures, non-JSON
//! bodies, GraphQL `errors`, and responses missing the rotated tokens all come back as the
//! `Err` side of [`RefreshOutcome`].

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	error::{ConfigError, RefreshError},
	graphql::{Headers, Response},
	http::JsonHttpClient,
};

/// Result of a single refresh exchange.
pub type RefreshOutcome = Result<RotatedTokens, RefreshError>;

/// Tokens issued by a successful refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotatedTokens {
	/// New access token.
	pub access_token: TokenSecret,
	/// New refresh token.
	pub refresh_token: TokenSecret,
}
impl From<RotatedTokens> for TokenPair {
	fn from(tokens: RotatedTokens) -> Self {
		Self { access_token: Some(tokens.access_token), refresh_token: Some(tokens.refresh_token) }
	}
}

/// JSON pointers locating the rotated tokens inside a refresh response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPaths {
	/// Pointer to the new access token.
	pub access_token: String,
	/// Pointer to the new refresh token.
	pub refresh_token: String,
}
impl TokenPaths {
	/// Creates paths from two JSON pointers (RFC 6901).
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let paths = Self { access_token: access_token.into(), refresh_token: refresh_token.into() };

		for path in [&paths.access_token, &paths.refresh_token] {
			if !path.is_empty() && !path.starts_with('/') {
				return Err(ConfigError::InvalidTokenPath { path: path.clone() });
			}
		}

		Ok(paths)
	}

	fn extract(&self, document: &Value) -> Result<RotatedTokens, RefreshError> {
		let lookup = |pointer: &str, missing: &'static str| {
			document
				.pointer(pointer)
				.and_then(Value::as_str)
				.filter(|token| !token.is_empty())
				.map(TokenSecret::new)
				.ok_or(RefreshError::MissingTokens { missing })
		};

		Ok(RotatedTokens {
			access_token: lookup(&self.access_token, "access")?,
			refresh_token: lookup(&self.refresh_token, "refresh")?,
		})
	}
}
impl Default for TokenPaths {
	fn default() -> Self {
		Self {
			access_token: "/data/token/accessToken".into(),
			refresh_token: "/data/token/refreshToken".into(),
		}
	}
}

/// Performs refresh exchanges against a fixed endpoint.
#[derive(Clone)]
pub struct TokenTransport {
	client: Arc<dyn JsonHttpClient>,
	endpoint: Url,
	paths: TokenPaths,
}
impl TokenTransport {
	/// Creates a transport posting to `endpoint` through `client`.
	pub fn new(client: Arc<dyn JsonHttpClient>, endpoint: Url, paths: TokenPaths) -> Self {
		Self { client, endpoint, paths }
	}

	/// Endpoint refresh calls are sent to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Sends one refresh request and classifies the answer.
	pub async fn refresh(&self, body: &Value, headers: &Headers) -> RefreshOutcome {
		let payload = serde_json::to_vec(body)
			.map_err(|_| RefreshError::InvalidBody { reason: "body must serialize to JSON" })?;
		let response = self.client.post_json(&self.endpoint, headers, payload).await?;
		let status = response.status;
		let document: Value = serde_path_to_error::deserialize(
			&mut serde_json::Deserializer::from_slice(&response.body),
		)
		.map_err(|source| RefreshError::Decode { source, status })?;
		let envelope: Response = serde_path_to_error::deserialize(document.clone())
			.map_err(|source| RefreshError::Decode { source, status })?;

		// Any non-null `errors` member fails the refresh, even an empty list.
		if document.get("errors").is_some_and(|errors| !errors.is_null()) {
			return Err(RefreshError::Rejected { errors: envelope.errors });
		}

		self.paths.extract(&document)
	}
}
impl Debug for TokenTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenTransport")
			.field("endpoint", &self.endpoint.as_str())
			.field("paths", &self.paths)
			.finish()
	}
}
