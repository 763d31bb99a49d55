//! Upstream VAT registry access.
//!
//! Wraps the EU VIES REST API. A lookup yields either a [`ViesPayload`]
//! or one of the [`ViesError`] outcomes; turning those into HTTP
//! responses is the gateway's job.
//!
//! # Example
//!
//! ```ignore
//! use vies_gateway::core::ValidationRequest;
//! use vies_gateway::vat::*;
//!
//! let client = ViesClient::new(DEFAULT_VIES_BASE_URL.parse()?, DEFAULT_TIMEOUT)?;
//! let request = ValidationRequest::new(Some("DE"), Some("123456789"))?;
//! let result = client.check(&request).await?.into_result();
//! println!("valid: {}", result.valid);
//! ```

mod vies;

pub use vies::{DEFAULT_TIMEOUT, DEFAULT_VIES_BASE_URL, ViesClient, ViesError, ViesPayload};
