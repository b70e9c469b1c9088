//! HTTP terminal posting operations to a GraphQL endpoint.

// self
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};
use crate::{
	_prelude::*,
	graphql::{Operation, Response},
	http::JsonHttpClient,
	link::{LinkFuture, Terminal},
};

/// Posts `{ query, operationName, variables }` with the operation's headers and decodes the
/// GraphQL response, whatever its HTTP status.
#[derive(Clone)]
pub struct HttpLink {
	client: Arc<dyn JsonHttpClient>,
	endpoint: Url,
}
impl HttpLink {
	/// Creates a terminal posting to `endpoint` through `client`.
	pub fn new(client: Arc<dyn JsonHttpClient>, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	/// Creates a terminal backed by a default reqwest client.
	#[cfg(feature = "reqwest")]
	pub fn reqwest(endpoint: Url) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self::new(Arc::new(ReqwestHttpClient::with_client(client)), endpoint))
	}

	/// Endpoint operations are posted to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}
impl Terminal for HttpLink {
	fn execute<'a>(&'a self, operation: Operation) -> LinkFuture<'a> {
		Box::pin(async move {
			let mut headers = operation.headers.clone();

			if !headers.keys().any(|name| name.eq_ignore_ascii_case("content-type")) {
				headers.insert("content-type".into(), "application/json".into());
			}

			let body = operation.to_body().to_string().into_bytes();
			let response = self.client.post_json(&self.endpoint, &headers, body).await?;
			let status = response.status;

			serde_path_to_error::deserialize::<_, Response>(
				&mut serde_json::Deserializer::from_slice(&response.body),
			)
			.map_err(|source| Error::ResponseParse { source, status })
		})
	}
}
impl Debug for HttpLink {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpLink").field("endpoint", &self.endpoint.as_str()).finish()
	}
}
