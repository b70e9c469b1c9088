//! Link-level error types shared across the controller, transport, and pipeline stages.

// self
use crate::{_prelude::*, graphql::GraphQLError};

/// Link-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while executing a GraphQL operation.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token store failure.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),
	/// Refresh rotation failure.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// An empty string was passed where a bearer token was expected.
	#[error("Invalid token provided.")]
	InvalidToken,
	/// GraphQL endpoint responded with a body that is not a GraphQL response.
	#[error("GraphQL endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Server rejected the presented credential, even after the one-shot retry.
	#[error("Request is unauthenticated: {message}.")]
	Unauthenticated {
		/// Message attached to the `UNAUTHENTICATED` GraphQL error.
		message: String,
	},
}

/// Configuration and validation failures raised while building a link.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No HTTP client was supplied and the `reqwest` feature is disabled.
	#[error("An HTTP client is required when the reqwest feature is disabled.")]
	MissingHttpClient,
	/// No token store was supplied.
	#[error("A token store is required.")]
	MissingStore,
	/// Neither a refresh query nor a refresh body template was supplied.
	#[error("A refresh request shape is required.")]
	MissingRefreshRequest,
	/// A token path is not a valid JSON pointer.
	#[error("Token path `{path}` must be empty or start with `/`.")]
	InvalidTokenPath {
		/// Offending pointer.
		path: String,
	},
	/// The custom credential header name is empty.
	#[error("Credential header name must not be empty.")]
	EmptyHeaderName,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the GraphQL endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the GraphQL endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Reasons a refresh rotation did not produce a usable token pair.
///
/// Every variant is absorbed by the controller: the cache is cleared and the
/// [`RefreshListener`](crate::controller::RefreshListener) is told what happened.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// The refresh endpoint could not be reached.
	#[error("Refresh request failed in transit.")]
	Transport(#[from] TransportError),
	/// The refresh endpoint answered with something other than JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// The refresh endpoint reported GraphQL errors, usually an invalid refresh token.
	#[error("Refresh endpoint rejected the refresh token: {}.", summarize(.errors))]
	Rejected {
		/// Errors reported by the endpoint.
		errors: Vec<GraphQLError>,
	},
	/// The response decoded but the rotated tokens were not where they were expected.
	#[error("Refresh response is missing the {missing} token.")]
	MissingTokens {
		/// Which token could not be found.
		missing: &'static str,
	},
	/// The refresh body template produced a value that cannot carry variables.
	#[error("Refresh body is invalid: {reason}.")]
	InvalidBody {
		/// What was wrong with the body.
		reason: &'static str,
	},
	/// The refresh listener refused the rotated tokens.
	#[error("Refresh listener declined the rotated tokens.")]
	Declined,
}

fn summarize(errors: &[GraphQLError]) -> String {
	if errors.is_empty() {
		return "no error details".into();
	}

	errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
}
