//! Secure token secret wrapper that redacts sensitive material.

// self
use crate::{_prelude::*, auth::token::expiry};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Wraps `value` unless it is missing or empty.
	pub fn non_empty(value: Option<impl Into<String>>) -> Option<Self> {
		value.map(Into::into).filter(|v: &String| !v.is_empty()).map(Self)
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Evaluates the token's expiry claim at `now`; undecodable tokens count as live.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		expiry::claim_expired(&self.0, now)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
