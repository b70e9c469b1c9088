//! JWT expiry evaluation.
//!
//! Only the payload's `exp` claim is read; signatures are never verified. A token whose
//! claims cannot be decoded is treated as live so the server remains the authority on
//! whether it is accepted.

// crates.io
use base64::{
	Engine,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
// self
use crate::_prelude::*;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&base64::alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Deserialize)]
struct Claims {
	#[serde(default)]
	exp: Option<Value>,
}

/// Returns whether `token` is expired according to the system clock.
///
/// Fails with [`Error::InvalidToken`] when `token` is empty.
pub fn is_expired(token: &str) -> Result<bool> {
	is_expired_at(token, OffsetDateTime::now_utc())
}

/// Returns whether `token` is expired at `now`.
///
/// A token is expired iff `now` is strictly after its `exp` claim. Tokens without a
/// decodable numeric `exp` are reported as not expired.
pub fn is_expired_at(token: &str, now: OffsetDateTime) -> Result<bool> {
	if token.is_empty() {
		return Err(Error::InvalidToken);
	}

	Ok(claim_expired(token, now))
}

/// Decodes the `exp` claim of `token` as an instant.
pub fn expires_at(token: &str) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(exp_nanos(token)?).ok()
}

pub(crate) fn claim_expired(token: &str, now: OffsetDateTime) -> bool {
	match exp_nanos(token) {
		Some(exp) => now.unix_timestamp_nanos() > exp,
		None => false,
	}
}

// `exp` in nanoseconds since the epoch; whole seconds stay exact, fractional ones go through f64.
fn exp_nanos(token: &str) -> Option<i128> {
	const NANOS_PER_SECOND: i128 = 1_000_000_000;

	let payload = token.split('.').nth(1)?;
	let bytes = PAYLOAD_ENGINE.decode(payload).ok()?;
	let exp = serde_json::from_slice::<Claims>(&bytes).ok()?.exp?;

	if let Some(secs) = exp.as_i64() {
		return Some(i128::from(secs) * NANOS_PER_SECOND);
	}

	exp.as_f64().filter(|secs| secs.is_finite()).map(|secs| (secs * 1e9) as i128)
}
