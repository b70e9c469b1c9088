//! Pipeline adapter: the middleware seam and the token stages plugged into it.
//!
//! A [`Pipeline`] runs an [`Operation`] through an ordered list of [`Link`]s and finally a
//! [`Terminal`]. Each link receives a [`Next`] handle it may call zero or more times, which
//! is how the unauthenticated interceptor replays a request.
//!
//! [`TokenLink`] exposes the controller as stages in one of two layouts:
//!
//! - [`StageLayout::Composed`]: an auth stage (populate, refresh, attach) followed by the
//!   unauthenticated interceptor.
//! - [`StageLayout::Split`]: five stages for populate, expiry check, headers, interceptor, and
//!   refresh.

pub mod stages;
pub mod terminal;

pub use stages::*;
pub use terminal::HttpLink;

// self
use crate::{
	_prelude::*,
	config::{LinkConfig, LinkConfigBuilder},
	controller::TokenController,
	graphql::{Operation, Response},
};

/// Boxed future returned by [`Link::call`] and [`Terminal::execute`].
pub type LinkFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

/// A middleware stage.
pub trait Link
where
	Self: Send + Sync,
{
	/// Handles `operation`, usually by adjusting it and forwarding to `next`.
	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a>;
}

/// The stage that actually executes an operation.
pub trait Terminal
where
	Self: Send + Sync,
{
	/// Executes `operation` and returns the server's answer.
	fn execute<'a>(&'a self, operation: Operation) -> LinkFuture<'a>;
}

/// The remainder of a pipeline as seen by one link.
#[derive(Clone, Copy)]
pub struct Next<'a> {
	links: &'a [Arc<dyn Link>],
	terminal: &'a dyn Terminal,
}
impl<'a> Next<'a> {
	/// Creates a handle running `links` in order and then `terminal`.
	pub fn new(links: &'a [Arc<dyn Link>], terminal: &'a dyn Terminal) -> Self {
		Self { links, terminal }
	}

	/// Forwards `operation` to the next stage.
	pub fn run(self, operation: Operation) -> LinkFuture<'a> {
		match self.links.split_first() {
			Some((link, rest)) => link.call(operation, Next { links: rest, terminal: self.terminal }),
			None => self.terminal.execute(operation),
		}
	}
}
impl Debug for Next<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Next").field("remaining_links", &self.links.len()).finish()
	}
}

// Lets a nested chain continue into the outer pipeline once its own links are exhausted.
struct Resume<'a>(Next<'a>);
impl Terminal for Resume<'_> {
	fn execute<'b>(&'b self, operation: Operation) -> LinkFuture<'b> {
		self.0.run(operation)
	}
}

/// Several links run in order as a single link.
#[derive(Clone, Default)]
pub struct Chain {
	links: Vec<Arc<dyn Link>>,
}
impl Chain {
	/// Creates a chain from `links`.
	pub fn new(links: Vec<Arc<dyn Link>>) -> Self {
		Self { links }
	}

	/// Appends a link.
	pub fn with_link(mut self, link: impl 'static + Link) -> Self {
		self.links.push(Arc::new(link));

		self
	}

	/// Number of links in the chain.
	pub fn len(&self) -> usize {
		self.links.len()
	}

	/// Returns `true` when the chain has no links.
	pub fn is_empty(&self) -> bool {
		self.links.is_empty()
	}
}
impl Link for Chain {
	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			let resume = Resume(next);

			Next::new(&self.links, &resume).run(operation).await
		})
	}
}
impl Debug for Chain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Chain").field("links", &self.links.len()).finish()
	}
}

/// Ordered links in front of a terminal.
#[derive(Clone)]
pub struct Pipeline {
	links: Vec<Arc<dyn Link>>,
	terminal: Arc<dyn Terminal>,
}
impl Pipeline {
	/// Creates a pipeline that sends operations straight to `terminal`.
	pub fn new(terminal: impl 'static + Terminal) -> Self {
		Self { links: Vec::new(), terminal: Arc::new(terminal) }
	}

	/// Appends a link in front of the terminal.
	pub fn with_link(mut self, link: impl 'static + Link) -> Self {
		self.links.push(Arc::new(link));

		self
	}

	/// Appends several already shared links.
	pub fn with_links<I>(mut self, links: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Link>>,
	{
		self.links.extend(links);

		self
	}

	/// Runs `operation` through every link and the terminal.
	pub async fn execute(&self, operation: Operation) -> Result<Response> {
		Next::new(&self.links, self.terminal.as_ref()).run(operation).await
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline").field("links", &self.links.len()).finish()
	}
}

/// How [`TokenLink::stages`] splits the token logic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StageLayout {
	/// Auth stage plus unauthenticated interceptor.
	#[default]
	Composed,
	/// Populate, expiry check, headers, interceptor, and refresh stages.
	Split,
}

/// Entry point: one controller exposed as pipeline stages.
#[derive(Clone, Debug)]
pub struct TokenLink {
	controller: Arc<TokenController>,
}
impl TokenLink {
	/// Creates a link around a fresh controller.
	pub fn new(config: LinkConfig) -> Self {
		Self { controller: Arc::new(TokenController::new(config)) }
	}

	/// Returns a configuration builder targeting `api_url`.
	pub fn builder(api_url: Url) -> LinkConfigBuilder {
		LinkConfig::builder(api_url)
	}

	/// The shared controller behind every stage.
	pub fn controller(&self) -> &Arc<TokenController> {
		&self.controller
	}

	/// Returns the composed layout as a single link.
	pub fn link(&self) -> Chain {
		Chain::new(self.stages(StageLayout::Composed))
	}

	/// Returns the stages of `layout`, in pipeline order.
	pub fn stages(&self, layout: StageLayout) -> Vec<Arc<dyn Link>> {
		fn stage(link: impl 'static + Link) -> Arc<dyn Link> {
			Arc::new(link)
		}

		let controller = &self.controller;

		match layout {
			StageLayout::Composed => vec![
				stage(AuthLink::new(controller.clone())),
				stage(UnauthenticatedLink::new(controller.clone(), true)),
			],
			StageLayout::Split => vec![
				stage(PopulateLink::new(controller.clone())),
				stage(ExpiryLink::new(controller.clone())),
				stage(HeadersLink::new(controller.clone())),
				stage(UnauthenticatedLink::new(controller.clone(), false)),
				stage(RefreshLink::new(controller.clone())),
			],
		}
	}
}
