//! Token stages built on a shared [`TokenController`].

// self
use crate::{
	_prelude::*,
	controller::{RefreshAttempt, TokenController},
	graphql::Operation,
	link::{Link, LinkFuture, Next},
	obs::{self, LinkSpan, Stage},
};

/// How many times one original request is replayed after an unauthenticated response.
pub const MAX_UNAUTHENTICATED_RETRIES: u8 = 1;

/// Populates, refreshes, and attaches the credential in one stage.
#[derive(Clone, Debug)]
pub struct AuthLink {
	controller: Arc<TokenController>,
}
impl AuthLink {
	/// Creates the stage.
	pub fn new(controller: Arc<TokenController>) -> Self {
		Self { controller }
	}
}
impl Link for AuthLink {
	fn call<'a>(&'a self, mut operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			if let Some(headers) = self.controller.prepare_auth(&operation.headers).await {
				operation.headers = headers;
			}

			next.run(operation).await
		})
	}
}

/// Reads the token store into an empty cache.
#[derive(Clone, Debug)]
pub struct PopulateLink {
	controller: Arc<TokenController>,
}
impl PopulateLink {
	/// Creates the stage.
	pub fn new(controller: Arc<TokenController>) -> Self {
		Self { controller }
	}
}
impl Link for PopulateLink {
	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			self.controller.populate().await;

			next.run(operation).await
		})
	}
}

/// Flags the cached access token when its `exp` claim has passed.
#[derive(Clone, Debug)]
pub struct ExpiryLink {
	controller: Arc<TokenController>,
}
impl ExpiryLink {
	/// Creates the stage.
	pub fn new(controller: Arc<TokenController>) -> Self {
		Self { controller }
	}
}
impl Link for ExpiryLink {
	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		self.controller.check_expiry();

		next.run(operation)
	}
}

/// Attaches the cached credential when it is usable.
#[derive(Clone, Debug)]
pub struct HeadersLink {
	controller: Arc<TokenController>,
}
impl HeadersLink {
	/// Creates the stage.
	pub fn new(controller: Arc<TokenController>) -> Self {
		Self { controller }
	}
}
impl Link for HeadersLink {
	fn call<'a>(&'a self, mut operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		if let Some(headers) = self.controller.authorize(&operation.headers) {
			operation.headers = headers;
		}

		next.run(operation)
	}
}

/// Rotates a stale pair and re-attaches the credential that results.
///
/// Placed after the headers stage, it covers requests whose cached token expired or was
/// rejected. A cleared or skipped refresh strips the stale credential.
#[derive(Clone, Debug)]
pub struct RefreshLink {
	controller: Arc<TokenController>,
}
impl RefreshLink {
	/// Creates the stage.
	pub fn new(controller: Arc<TokenController>) -> Self {
		Self { controller }
	}
}
impl Link for RefreshLink {
	fn call<'a>(&'a self, mut operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			if self.controller.refresh_if_stale().await != RefreshAttempt::NotNeeded {
				operation.headers = self.controller.authorize(&operation.headers).unwrap_or_else(
					|| self.controller.config().auth_scheme.strip_credential(&operation.headers),
				);
			}

			next.run(operation).await
		})
	}
}

/// Replays a request once when the server rejects its credential.
///
/// The rejected credential is invalidated (unless it was already rotated away), the request
/// headers are re-authorized, and the rest of the pipeline runs again. The retry counter
/// lives in [`OperationContext`](crate::graphql::OperationContext), so a second rejection is
/// returned to the caller untouched.
#[derive(Clone, Debug)]
pub struct UnauthenticatedLink {
	controller: Arc<TokenController>,
	reauthorize: bool,
}
impl UnauthenticatedLink {
	/// Creates the stage.
	///
	/// With `reauthorize` the stage refreshes inline before replaying. Without it, the stage
	/// only attaches an already cached credential and leaves rotation to a later
	/// [`RefreshLink`].
	pub fn new(controller: Arc<TokenController>, reauthorize: bool) -> Self {
		Self { controller, reauthorize }
	}
}
impl Link for UnauthenticatedLink {
	fn call<'a>(&'a self, mut operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		let span = LinkSpan::new(Stage::Intercept);

		Box::pin(span.instrument(async move {
			loop {
				let response = next.run(operation.clone()).await?;

				if !response.is_unauthenticated()
					|| operation.context.unauthenticated_retries >= MAX_UNAUTHENTICATED_RETRIES
				{
					return Ok::<_, Error>(response);
				}

				operation.context.unauthenticated_retries += 1;

				let controller = &self.controller;
				let scheme = &controller.config().auth_scheme;

				obs::trace_stage(controller.config().debug_mode, Stage::Intercept, false);

				if let Some(presented) = scheme.presented_credential(&operation.headers) {
					controller.invalidate(Some(presented));
				}

				let reauthorized = if self.reauthorize {
					controller.prepare_auth(&operation.headers).await
				} else {
					controller.authorize(&operation.headers)
				};

				operation.headers =
					reauthorized.unwrap_or_else(|| scheme.strip_credential(&operation.headers));
			}
		}))
	}
}
