//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc, time::Duration as StdDuration};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use serde_json::{Value, json};
use time::{OffsetDateTime, macros};
// self
use graphql_token_link::{
	auth::TokenPair,
	clock::ManualClock,
	config::{LinkConfig, LinkConfigBuilder},
	error::TransportError,
	graphql::Headers,
	http::{HttpFuture, HttpResponse, JsonHttpClient},
	store::{MemoryStore, StoreFuture, TokenStore},
	url::Url,
};

pub const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);
pub const REFRESH_QUERY: &str =
	"mutation Refresh($refreshToken: String!) { token(refreshToken: $refreshToken) { accessToken refreshToken } }";

/// Unsigned JWT whose payload only carries `exp`.
pub fn jwt(exp: OffsetDateTime) -> String {
	format!(
		"{}.{}.sig",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp.unix_timestamp()))
	)
}

/// Successful refresh response in the default token layout.
pub fn rotation(access: &str, refresh: &str) -> HttpResponse {
	HttpResponse::new(
		200,
		json!({ "data": { "token": { "accessToken": access, "refreshToken": refresh } } })
			.to_string(),
	)
}

/// Refresh response carrying a GraphQL error.
pub fn rejection(message: &str) -> HttpResponse {
	HttpResponse::new(
		200,
		json!({ "data": null, "errors": [{ "message": message, "extensions": { "code": "UNAUTHENTICATED" } }] })
			.to_string(),
	)
}

pub fn api_url() -> Url {
	Url::parse("https://api.example.com/graphql").expect("Fixture URL should parse.")
}

/// A refresh request as the scripted client saw it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub url: Url,
	pub headers: Headers,
	pub body: Value,
}

/// JSON client answering from a queue; an exhausted queue is a connection failure.
#[derive(Clone, Default)]
pub struct ScriptedClient {
	responses: Arc<Mutex<VecDeque<HttpResponse>>>,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
	delay: Option<StdDuration>,
}
impl ScriptedClient {
	pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
		Self { responses: Arc::new(Mutex::new(responses.into_iter().collect())), ..Default::default() }
	}

	pub fn with_delay(mut self, delay: StdDuration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn push(&self, response: HttpResponse) {
		self.responses.lock().push_back(response);
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}
}
impl JsonHttpClient for ScriptedClient {
	fn post_json<'a>(&'a self, url: &'a Url, headers: &'a Headers, body: Vec<u8>) -> HttpFuture<'a> {
		self.requests.lock().push(RecordedRequest {
			url: url.clone(),
			headers: headers.clone(),
			body: serde_json::from_slice(&body).expect("Refresh body should be JSON."),
		});

		let response = self.responses.lock().pop_front();
		let delay = self.delay;

		Box::pin(async move {
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			response.ok_or_else(|| TransportError::Io(std::io::Error::other("connection refused")))
		})
	}
}

/// Store that yields before answering, so concurrent callers overlap.
#[derive(Clone, Default)]
pub struct SlowStore {
	pub inner: MemoryStore,
	pub delay: StdDuration,
}
impl SlowStore {
	pub fn new(pair: TokenPair, delay: StdDuration) -> Self {
		Self { inner: MemoryStore::with_pair(pair), delay }
	}
}
impl TokenStore for SlowStore {
	fn load(&self) -> StoreFuture<'_, TokenPair> {
		Box::pin(async move {
			tokio::time::sleep(self.delay).await;

			self.inner.load().await
		})
	}
}

/// Builder wired to the scripted client and a frozen clock.
pub fn config(
	store: impl 'static + TokenStore,
	client: ScriptedClient,
	clock: ManualClock,
) -> LinkConfigBuilder {
	LinkConfig::builder(api_url())
		.store(store)
		.refresh_query(REFRESH_QUERY)
		.http_client(client)
		.clock(clock)
}
