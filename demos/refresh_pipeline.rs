//! Demonstrates the composed token link in front of the reqwest terminal: the stored access
//! token is rejected, rotated through the refresh mutation, and the query is replayed once.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use graphql_token_link::{
	auth::TokenPair,
	config::LinkConfig,
	graphql::Operation,
	link::{HttpLink, Pipeline, TokenLink},
	store::MemoryStore,
};

const REFRESH_QUERY: &str = "mutation Refresh($refreshToken: String!) { token(refreshToken: $refreshToken) { accessToken refreshToken } }";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").json_body(
				json!({ "query": REFRESH_QUERY, "variables": { "refreshToken": "demo-refresh" } }),
			);
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"token\":{\"accessToken\":\"demo-access-2\",\"refreshToken\":\"demo-refresh-2\"}}}",
			);
		})
		.await;
	let rejected_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":null,\"errors\":[{\"message\":\"Session expired.\",\"extensions\":{\"code\":\"UNAUTHENTICATED\"}}]}",
			);
		})
		.await;
	let accepted_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").header("authorization", "Bearer demo-access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"me\":{\"id\":\"demo-user\"}}}");
		})
		.await;
	let endpoint = Url::parse(&server.url("/graphql"))?;
	let store = MemoryStore::with_pair(TokenPair::new("demo-access", "demo-refresh"));
	let link = TokenLink::new(
		LinkConfig::builder(endpoint.clone())
			.store(store)
			.refresh_query(REFRESH_QUERY)
			.debug_mode(true)
			.build()?,
	);
	let pipeline = Pipeline::new(HttpLink::reqwest(endpoint)?).with_link(link.link());
	let response = pipeline
		.execute(Operation::new("query Me { me { id } }").with_operation_name("Me"))
		.await?
		.ensure_authenticated()?;

	println!("Authenticated response: {}.", json!(response.data));
	println!("Cached pair after rotation: {:?}.", link.controller().snapshot());

	refresh_mock.assert_async().await;
	rejected_mock.assert_async().await;
	accepted_mock.assert_async().await;

	Ok(())
}
