//! Bearer-token middleware for GraphQL clients: lazy token-store reads, coalesced refresh
//! rotation, and a one-shot retry when the server answers `UNAUTHENTICATED`.
//!
//! Build a [`link::TokenLink`] from a [`config::LinkConfig`], then either plug the composed
//! [`link::TokenLink::link`] stage into a [`link::Pipeline`] or take the individual stages via
//! [`link::TokenLink::stages`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod graphql;
pub mod http;
pub mod link;
pub mod obs;
pub mod request;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
