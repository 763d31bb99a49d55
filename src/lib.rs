//! # vies-gateway
//!
//! Stateless HTTP gateway that checks EU VAT numbers against the VIES
//! registry on behalf of browser clients.
//!
//! `GET /vat/{countryCode}/{vatNumber}` is forwarded once to the VIES REST
//! API and the answer is normalised into a stable JSON contract:
//!
//! | Upstream outcome | Gateway response |
//! |------------------|------------------|
//! | 2xx | `200 {valid, traderName?, traderAddress?, requestDate}` |
//! | non-2xx | same status, `{error, details}` |
//! | timeout | `504 {error}` |
//! | transport fault | `500 {error, message}` |
//!
//! Missing or undecodable parameters are answered with `400` before any
//! upstream call.
//! Every response, preflights included, allows any origin.
//!
//! ## Quick Start
//!
//! ```rust
//! use vies_gateway::core::ValidationRequest;
//!
//! let request = ValidationRequest::from_path("DE/123456789").unwrap();
//! assert_eq!(request.lookup_key(), "DE123456789");
//! assert!(ValidationRequest::from_path("DE").is_err());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Request/response types, parameter validation |
//! | `vies` | VIES REST client |
//! | `server` (default) | axum router, config, `vies-gateway` binary |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "vies")]
pub mod vat;

#[cfg(feature = "server")]
pub mod config;

#[cfg(feature = "server")]
pub mod gateway;
