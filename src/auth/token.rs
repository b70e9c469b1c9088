//! Bearer token primitives.

pub mod expiry;
pub mod pair;
pub mod secret;
