//! GraphQL operation and response models exchanged between pipeline stages.
//!
//! Headers are plain `BTreeMap<String, String>` values so stages stay independent of any
//! particular HTTP client.

// self
use crate::_prelude::*;

/// Header map carried by an [`Operation`].
pub type Headers = BTreeMap<String, String>;

/// Error code servers attach to `extensions.code` when the credential is rejected.
pub const UNAUTHENTICATED_CODE: &str = "UNAUTHENTICATED";

/// A GraphQL operation travelling down the pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Operation {
	/// GraphQL document.
	pub query: String,
	/// Optional operation name.
	pub operation_name: Option<String>,
	/// Operation variables.
	pub variables: Map<String, Value>,
	/// Outgoing request headers.
	pub headers: Headers,
	/// Per-request bookkeeping owned by the pipeline.
	pub context: OperationContext,
}
impl Operation {
	/// Creates an operation for the provided document.
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), ..Default::default() }
	}

	/// Sets the operation name.
	pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
		self.operation_name = Some(name.into());

		self
	}

	/// Sets a single variable.
	pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.variables.insert(name.into(), value.into());

		self
	}

	/// Sets a single header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// JSON body posted to a GraphQL endpoint.
	pub fn to_body(&self) -> Value {
		let mut body = Map::new();

		body.insert("query".into(), Value::String(self.query.clone()));

		if let Some(name) = &self.operation_name {
			body.insert("operationName".into(), Value::String(name.clone()));
		}

		body.insert("variables".into(), Value::Object(self.variables.clone()));

		Value::Object(body)
	}
}

/// Pipeline-owned state attached to a single original request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationContext {
	/// Number of times this request was replayed after an unauthenticated response.
	pub unauthenticated_retries: u8,
}

/// A decoded GraphQL response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
	/// Result payload.
	#[serde(default)]
	pub data: Option<Value>,
	/// Errors reported by the server; absent and `null` both decode as empty.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub errors: Vec<GraphQLError>,
	/// Server extensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extensions: Option<Value>,
}
impl Response {
	/// Creates a successful response carrying `data`.
	pub fn data(data: Value) -> Self {
		Self { data: Some(data), ..Default::default() }
	}

	/// Creates an error-only response.
	pub fn errors(errors: Vec<GraphQLError>) -> Self {
		Self { errors, ..Default::default() }
	}

	/// Returns the first error whose code is `UNAUTHENTICATED`.
	pub fn unauthenticated(&self) -> Option<&GraphQLError> {
		self.errors.iter().find(|e| e.code() == Some(UNAUTHENTICATED_CODE))
	}

	/// Returns `true` when the server rejected the presented credential.
	pub fn is_unauthenticated(&self) -> bool {
		self.unauthenticated().is_some()
	}

	/// Converts a rejected-credential response into [`Error::Unauthenticated`].
	pub fn ensure_authenticated(self) -> Result<Self> {
		match self.unauthenticated() {
			Some(e) => Err(Error::Unauthenticated { message: e.message.clone() }),
			None => Ok(self),
		}
	}
}

/// A single GraphQL error entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
	/// Human-readable message.
	#[serde(default)]
	pub message: String,
	/// Response path the error applies to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<Vec<Value>>,
	/// Server-defined extensions, conventionally carrying `code`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extensions: Option<Map<String, Value>>,
}
impl GraphQLError {
	/// Creates an error with only a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), ..Default::default() }
	}

	/// Sets `extensions.code`.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.extensions
			.get_or_insert_with(Map::new)
			.insert("code".into(), Value::String(code.into()));

		self
	}

	/// Reads `extensions.code`, if it is a string.
	pub fn code(&self) -> Option<&str> {
		self.extensions.as_ref()?.get("code")?.as_str()
	}
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<GraphQLError>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<Vec<GraphQLError>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn unauthenticated_lookup_scans_every_error() {
		let response: Response = serde_json::from_value(json!({
			"data": null,
			"errors": [
				{ "message": "boom" },
				{ "message": "no session", "extensions": { "code": "UNAUTHENTICATED" } }
			]
		}))
		.expect("Response fixture should decode.");

		assert_eq!(response.unauthenticated().map(|e| e.message.as_str()), Some("no session"));
		assert!(matches!(
			response.ensure_authenticated(),
			Err(Error::Unauthenticated { message }) if message == "no session"
		));
	}

	#[test]
	fn missing_or_null_errors_never_match() {
		let missing: Response =
			serde_json::from_value(json!({ "data": { "ok": true } })).expect("Should decode.");
		let null: Response =
			serde_json::from_value(json!({ "data": null, "errors": null })).expect("Should decode.");
		let uncoded: Response =
			serde_json::from_value(json!({ "errors": [{ "message": "x", "extensions": { "code": 7 } }] }))
				.expect("Should decode.");

		assert!(!missing.is_unauthenticated());
		assert!(!null.is_unauthenticated());
		assert!(!uncoded.is_unauthenticated());
	}

	#[test]
	fn operation_body_includes_name_and_variables() {
		let op = Operation::new("query Me { me { id } }")
			.with_operation_name("Me")
			.with_variable("first", 10);

		assert_eq!(
			op.to_body(),
			json!({ "query": "query Me { me { id } }", "operationName": "Me", "variables": { "first": 10 } })
		);
	}
}
