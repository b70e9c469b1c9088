//! The cached access/refresh token pair.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Access and refresh tokens as held by the controller and returned by a token store.
///
/// Serialized with camelCase keys (`accessToken`, `refreshToken`) so stores can persist the
/// pair as-is. Empty strings never survive construction.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
	/// Short-lived bearer credential.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential exchanged for a new pair.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl TokenPair {
	/// Builds a pair holding both tokens.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self::from_parts(Some(access_token), Some(refresh_token))
	}

	/// Builds a pair from optional parts, dropping empty strings.
	pub fn from_parts(
		access_token: Option<impl Into<String>>,
		refresh_token: Option<impl Into<String>>,
	) -> Self {
		Self {
			access_token: TokenSecret::non_empty(access_token),
			refresh_token: TokenSecret::non_empty(refresh_token),
		}
	}

	/// Returns an empty pair.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Drops tokens that were constructed from empty strings.
	pub fn normalized(self) -> Self {
		let keep = |secret: &TokenSecret| !secret.expose().is_empty();

		Self {
			access_token: self.access_token.filter(keep),
			refresh_token: self.refresh_token.filter(keep),
		}
	}

	/// Returns `true` when neither token is present.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}

	/// Returns `true` when both tokens are present.
	pub fn is_complete(&self) -> bool {
		self.access_token.is_some() && self.refresh_token.is_some()
	}

	/// Exposes the access token value.
	pub fn access(&self) -> Option<&str> {
		self.access_token.as_ref().map(TokenSecret::expose)
	}

	/// Exposes the refresh token value.
	pub fn refresh(&self) -> Option<&str> {
		self.refresh_token.as_ref().map(TokenSecret::expose)
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<TokenSecret>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(TokenSecret::non_empty(Option::<String>::deserialize(deserializer)?))
}
