//! Request and response shapes exchanged with gateway callers.
//!
//! Everything here is transient: a [`ValidationRequest`] lives for one
//! inbound call and produces either a [`ValidationResult`] or an
//! [`ErrorBody`].

mod error;
mod types;

pub use error::*;
pub use types::*;
