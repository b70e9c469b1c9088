mod common;

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use time::Duration;
// self
use common::*;
use graphql_token_link::{
	auth::TokenPair,
	clock::ManualClock,
	controller::{
		ListenerFuture, RefreshAttempt, RefreshListener, RefreshVerdict, SkipReason,
		TokenController,
	},
	error::RefreshError,
	graphql::Headers,
	request::{AuthScheme, TemplateFuture, VariablesProvider},
	store::MemoryStore,
	transport::{RefreshOutcome, TokenPaths},
};

#[derive(Clone, Default)]
struct RecordingListener {
	outcomes: Arc<Mutex<Vec<Result<String, String>>>>,
	verdict: RefreshVerdict,
}
impl RefreshListener for RecordingListener {
	fn on_refresh_complete<'a>(&'a self, outcome: &'a RefreshOutcome) -> ListenerFuture<'a> {
		let summary = match outcome {
			Ok(tokens) => Ok(tokens.access_token.expose().to_owned()),
			Err(e) => Err(e.to_string()),
		};

		self.outcomes.lock().push(summary);

		let verdict = self.verdict;

		Box::pin(async move { verdict })
	}
}

struct DeviceVariables;
impl VariablesProvider for DeviceVariables {
	fn variables(&self) -> TemplateFuture<'_, Map<String, Value>> {
		Box::pin(async {
			let mut variables = Map::new();

			variables.insert("deviceId".into(), json!("device-7"));

			variables
		})
	}
}

fn controller(config: graphql_token_link::config::LinkConfigBuilder) -> TokenController {
	TokenController::new(config.build().expect("Test configuration should build."))
}

fn bearer(token: &str) -> Option<String> {
	Some(format!("Bearer {token}"))
}

#[tokio::test]
async fn stored_token_rotates_then_clears_on_refresh_failure() {
	let clock = ManualClock::new(NOW);
	let access = jwt(NOW + Duration::minutes(5));
	let rotated = jwt(NOW + Duration::minutes(20));
	let store = MemoryStore::with_pair(TokenPair::new(access.clone(), "R"));
	let client = ScriptedClient::new([rotation(&rotated, "R2")]);
	let controller = controller(config(store.clone(), client.clone(), clock.clone()));
	let headers =
		controller.prepare_auth(&Headers::new()).await.expect("Stored token should be attached.");

	assert_eq!(headers.get("authorization").cloned(), bearer(&access));
	assert_eq!(client.calls(), 0);

	clock.advance(Duration::minutes(6));

	let headers =
		controller.prepare_auth(&Headers::new()).await.expect("Rotated token should be attached.");

	assert_eq!(headers.get("authorization").cloned(), bearer(&rotated));
	assert_eq!(controller.snapshot(), TokenPair::new(rotated.clone(), "R2"));

	let request = &client.requests()[0];

	assert_eq!(request.url, api_url());
	assert_eq!(
		request.body,
		json!({ "query": REFRESH_QUERY, "variables": { "refreshToken": "R" } })
	);
	assert_eq!(
		request.headers,
		Headers::from([("Content-Type".to_owned(), "application/json".to_owned())])
	);

	clock.advance(Duration::minutes(30));
	client.push(rejection("Refresh token revoked."));

	assert_eq!(controller.prepare_auth(&Headers::new()).await, None);
	assert!(controller.snapshot().is_empty());
	assert_eq!(client.requests()[1].body["variables"]["refreshToken"], "R2");
	assert_eq!(store.loads(), 1);

	let metrics = controller.metrics();

	assert_eq!(metrics.attempts(), 2);
	assert_eq!(metrics.successes(), 1);
	assert_eq!(metrics.failures(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_store_read() {
	let access = jwt(NOW + Duration::hours(1));
	let store = SlowStore::new(TokenPair::new(access.clone(), "R"), StdDuration::from_millis(50));
	let controller = Arc::new(controller(config(
		store.clone(),
		ScriptedClient::default(),
		ManualClock::new(NOW),
	)));
	let tasks = (0..16)
		.map(|_| {
			let controller = controller.clone();

			tokio::spawn(async move { controller.prepare_auth(&Headers::new()).await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let headers = task
			.await
			.expect("Task should not panic.")
			.expect("Every caller should see the populated token.");

		assert_eq!(headers.get("authorization").cloned(), bearer(&access));
	}

	assert_eq!(store.inner.loads(), 1);
	assert_eq!(controller.metrics().store_reads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_expired_callers_share_one_refresh() {
	let rotated = jwt(NOW + Duration::hours(1));
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client =
		ScriptedClient::new([rotation(&rotated, "R2")]).with_delay(StdDuration::from_millis(50));
	let controller =
		Arc::new(controller(config(store, client.clone(), ManualClock::new(NOW))));
	let tasks = (0..16)
		.map(|_| {
			let controller = controller.clone();

			tokio::spawn(async move { controller.prepare_auth(&Headers::new()).await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let headers = task
			.await
			.expect("Task should not panic.")
			.expect("Every caller should see the rotated token.");

		assert_eq!(headers.get("authorization").cloned(), bearer(&rotated));
	}

	assert_eq!(client.calls(), 1);
	assert_eq!(controller.metrics().attempts(), 1);
}

#[tokio::test]
async fn listener_sees_every_outcome_and_can_veto() {
	let listener = RecordingListener { verdict: RefreshVerdict::Reject, ..Default::default() };
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client = ScriptedClient::new([rotation("A2", "R2")]);
	let controller = controller(
		config(store.clone(), client.clone(), ManualClock::new(NOW)).listener(listener.clone()),
	);

	assert_eq!(controller.prepare_auth(&Headers::new()).await, None);
	assert!(controller.snapshot().is_empty());

	// The store still holds the expired pair; the next rotation fails in transit.
	assert_eq!(controller.prepare_auth(&Headers::new()).await, None);

	let outcomes = listener.outcomes.lock().clone();

	assert_eq!(outcomes.len(), 2);
	assert_eq!(outcomes[0], Ok("A2".to_owned()));
	assert_eq!(outcomes[1], Err("Refresh request failed in transit.".to_owned()));
	assert_eq!(store.loads(), 2);
}

#[tokio::test]
async fn skipped_refresh_leaves_the_cache_untouched() {
	let pair = TokenPair::new(jwt(NOW - Duration::minutes(5)), jwt(NOW - Duration::minutes(1)));
	let listener = RecordingListener::default();
	let client = ScriptedClient::default();
	let controller = controller(
		config(MemoryStore::with_pair(pair.clone()), client.clone(), ManualClock::new(NOW))
			.listener(listener.clone()),
	);

	controller.populate().await;

	assert_eq!(
		controller.refresh_if_stale().await,
		RefreshAttempt::Skipped { reason: SkipReason::RefreshTokenExpired }
	);
	assert_eq!(controller.snapshot(), pair);
	assert_eq!(controller.authorize(&Headers::new()), None);
	assert_eq!(client.calls(), 0);
	assert!(listener.outcomes.lock().is_empty());
}

#[tokio::test]
async fn custom_body_paths_and_header_scheme() {
	let store = MemoryStore::with_pair(TokenPair::from_parts(None::<String>, Some("R")));
	let client = ScriptedClient::new([graphql_token_link::http::HttpResponse::new(
		200,
		json!({ "data": { "login": { "jwt": "A2", "refresh": "R2" } } }).to_string(),
	)]);
	let fetch_headers = Headers::from([("x-client".to_owned(), "ios".to_owned())]);
	let controller = controller(
		config(store, client.clone(), ManualClock::new(NOW))
			.refresh_body(json!({
				"query": "mutation Login { login { jwt refresh } }",
				"operationName": "Login",
				"variables": { "locale": "en" }
			}))
			.fetch_headers(fetch_headers.clone())
			.token_paths(
				TokenPaths::new("/data/login/jwt", "/data/login/refresh")
					.expect("Pointers should be valid."),
			)
			.auth_scheme(AuthScheme::Header("x-token".into())),
	);
	let base = Headers::from([("x-request-id".to_owned(), "42".to_owned())]);
	let headers = controller.prepare_auth(&base).await.expect("Rotated token should be attached.");

	assert_eq!(
		headers,
		Headers::from([
			("x-request-id".to_owned(), "42".to_owned()),
			("x-token".to_owned(), "A2".to_owned()),
		])
	);

	let request = &client.requests()[0];

	assert_eq!(request.headers, fetch_headers);
	assert_eq!(
		request.body,
		json!({
			"query": "mutation Login { login { jwt refresh } }",
			"operationName": "Login",
			"variables": { "locale": "en", "refreshToken": "R" }
		})
	);
}

#[tokio::test]
async fn query_shape_sends_extra_variables() {
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client = ScriptedClient::new([rotation("A2", "R2")]);
	let controller = controller(
		config(store, client.clone(), ManualClock::new(NOW)).refresh_variables(DeviceVariables),
	);

	controller.prepare_auth(&Headers::new()).await.expect("Rotated token should be attached.");

	assert_eq!(
		client.requests()[0].body["variables"],
		json!({ "deviceId": "device-7", "refreshToken": "R" })
	);
}

#[tokio::test]
async fn malformed_rotation_clears_the_cache() {
	let listener = RecordingListener::default();
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client = ScriptedClient::new([rotation("A2", "")]);
	let controller = controller(
		config(store, client, ManualClock::new(NOW)).listener(listener.clone()),
	);

	controller.populate().await;

	assert_eq!(controller.refresh_if_stale().await, RefreshAttempt::Cleared);
	assert!(controller.snapshot().is_empty());
	assert_eq!(
		listener.outcomes.lock()[0],
		Err(RefreshError::MissingTokens { missing: "refresh" }.to_string())
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reset_during_refresh_discards_the_rotation() {
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client =
		ScriptedClient::new([rotation("A2", "R2")]).with_delay(StdDuration::from_millis(100));
	let listener = RecordingListener::default();
	let controller = Arc::new(controller(
		config(store.clone(), client.clone(), ManualClock::new(NOW)).listener(listener.clone()),
	));

	controller.populate().await;

	let refreshing = tokio::spawn({
		let controller = controller.clone();

		async move { controller.refresh_if_stale().await }
	});

	while client.calls() == 0 {
		tokio::time::sleep(StdDuration::from_millis(1)).await;
	}

	store.save(TokenPair::default());
	controller.reset();

	assert_eq!(
		refreshing.await.expect("Refresh task should not panic."),
		RefreshAttempt::Coalesced
	);
	assert!(controller.snapshot().is_empty());
	assert!(listener.outcomes.lock().is_empty());
	assert_eq!(controller.metrics().successes(), 0);
	assert_eq!(controller.prepare_auth(&Headers::new()).await, None);
	assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn cleared_cache_is_read_again_by_the_next_request() {
	let store = MemoryStore::with_pair(TokenPair::new(jwt(NOW - Duration::minutes(1)), "R"));
	let client = ScriptedClient::new([rejection("refresh token revoked")]);
	let controller = controller(config(store.clone(), client, ManualClock::new(NOW)));

	controller.populate().await;

	assert_eq!(controller.refresh_if_stale().await, RefreshAttempt::Cleared);
	assert!(controller.snapshot().is_empty());

	let live = jwt(NOW + Duration::hours(1));

	store.save(TokenPair::new(live.clone(), "R2"));

	let headers =
		controller.prepare_auth(&Headers::new()).await.expect("Fresh store pair should attach.");

	assert_eq!(headers.get("authorization").cloned(), bearer(&live));
	assert_eq!(store.loads(), 2);
}
