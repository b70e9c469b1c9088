//! Token models: redacted secrets, the cached token pair, and JWT expiry evaluation.

pub mod token;

pub use token::{expiry::*, pair::*, secret::*};
