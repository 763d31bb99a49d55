//! Environment-driven gateway configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `VIES_GATEWAY_BIND` | `127.0.0.1:3000` |
//! | `VIES_BASE_URL` | [`DEFAULT_VIES_BASE_URL`] |
//! | `VIES_TIMEOUT_SECS` | `10` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::vat::{DEFAULT_TIMEOUT, DEFAULT_VIES_BASE_URL};

pub const BIND_VAR: &str = "VIES_GATEWAY_BIND";
pub const BASE_URL_VAR: &str = "VIES_BASE_URL";
pub const TIMEOUT_VAR: &str = "VIES_TIMEOUT_SECS";

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value:?}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} is not a valid http(s) URL: {value:?}")]
    InvalidBaseUrl { var: &'static str, value: String },

    #[error("{var} must be a positive whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Runtime settings for the gateway process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Base of the VIES REST API; lookups go to `{base}/ms/{cc}/vat/{num}`.
    pub vies_base_url: Url,
    /// Bound on each upstream lookup.
    pub upstream_timeout: Duration,
}

impl GatewayConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first variable with an invalid
    /// value. Unset or empty variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`GatewayConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get(BIND_VAR) {
            Some(value) => value.trim().parse::<SocketAddr>().map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_VAR,
                value: value.clone(),
            })?,
            None => SocketAddr::from(DEFAULT_BIND),
        };

        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_VIES_BASE_URL.to_string());
        let vies_base_url = parse_base_url(&base_url).ok_or_else(|| ConfigError::InvalidBaseUrl {
            var: BASE_URL_VAR,
            value: base_url.clone(),
        })?;

        let upstream_timeout = match get(TIMEOUT_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: value.clone(),
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            vies_base_url,
            upstream_timeout,
        })
    }
}

fn parse_base_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    let scheme_ok = matches!(url.scheme(), "http" | "https");
    (scheme_ok && !url.cannot_be_a_base()).then_some(url)
}
