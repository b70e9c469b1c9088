//! Transport primitives for JSON-over-HTTP exchanges.
//!
//! [`JsonHttpClient`] is the crate's only dependency on an HTTP stack. Both the refresh
//! rotation and the [`HttpLink`](crate::link::HttpLink) terminal go through it, so tests and
//! downstream crates can substitute their own client without touching the token logic.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError, graphql::Headers};

/// Boxed future returned by [`JsonHttpClient::post_json`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Raw response captured by a [`JsonHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Undecoded body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Abstraction over HTTP transports capable of posting a JSON document.
///
/// Implementations must send exactly one request, apply every entry of `headers`, and
/// return the status and body of whatever the server answered. Only failures to obtain a
/// response at all are errors; non-2xx statuses are left to the caller to classify.
pub trait JsonHttpClient
where
	Self: 'static + Send + Sync,
{
	/// POSTs `body` (already JSON-encoded) to `url`.
	fn post_json<'a>(&'a self, url: &'a Url, headers: &'a Headers, body: Vec<u8>)
	-> HttpFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl JsonHttpClient for ReqwestHttpClient {
	fn post_json<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a Headers,
		body: Vec<u8>,
	) -> HttpFuture<'a> {
		Box::pin(async move {
			let mut request = self.0.post(url.clone());

			for (name, value) in headers {
				request = request.header(name.as_str(), value.as_str());
			}

			let response = request.body(body).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, body })
		})
	}
}
