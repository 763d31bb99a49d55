//! EU VIES REST API client for VAT number lookups.

use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{error, info, warn};
use url::Url;

use crate::core::{ValidationRequest, ValidationResult};

/// Base URL of the public VIES REST API.
pub const DEFAULT_VIES_BASE_URL: &str = "https://ec.europa.eu/taxation_customs/vies/rest-api";

/// Upper bound for a single upstream lookup, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields the gateway reads from a successful VIES response.
///
/// Any other field the registry sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViesPayload {
    pub valid: Option<bool>,
    pub trader_name: Option<String>,
    pub trader_address: Option<String>,
}

impl ViesPayload {
    /// Decode the body of a 2xx response.
    ///
    /// Each field is read on its own: `valid` only if it is a boolean,
    /// `traderName` and `traderAddress` only if they are strings. A field
    /// of another type counts as absent without discarding the rest. A body
    /// that is not JSON decodes to the empty payload, which reports the
    /// number as not valid.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or_else(|e| {
            warn!("unexpected VIES response body, treating as not valid: {e}");
            Value::Null
        });
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            valid: value.get("valid").and_then(Value::as_bool),
            trader_name: text("traderName"),
            trader_address: text("traderAddress"),
        }
    }

    /// Turn the payload into the caller-facing result, stamped now.
    pub fn into_result(self) -> ValidationResult {
        ValidationResult::issued_now(
            self.valid.unwrap_or(false),
            self.trader_name,
            self.trader_address,
        )
    }
}

/// Why a VIES lookup produced no payload.
///
/// Timeouts and transport faults are told apart by `reqwest` alone: an
/// error counts as [`ViesError::Timeout`] exactly when
/// [`reqwest::Error::is_timeout`] says so, which covers connect, send and
/// body-read deadlines. Every other client-side failure (DNS, refused or
/// reset connections, TLS, an unreadable body) is [`ViesError::Transport`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ViesError {
    /// The registry answered with a non-2xx status.
    Rejected {
        status: u16,
        /// Raw response body: parsed JSON if it parses, the text otherwise.
        body: Value,
    },
    /// No complete response within the configured timeout.
    Timeout,
    /// The request failed below HTTP.
    Transport(String),
}

impl ViesError {
    /// The non-empty `message` string of a rejection body, if there is one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(describe(err))
        }
    }
}

impl fmt::Display for ViesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, body } => write!(f, "VIES rejected lookup with HTTP {status}: {body}"),
            Self::Timeout => write!(f, "VIES lookup timed out"),
            Self::Transport(e) => write!(f, "VIES transport error: {e}"),
        }
    }
}

impl std::error::Error for ViesError {}

/// `err` and its whole source chain on one line.
fn describe(err: &reqwest::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

fn rejection_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Lookup client for the VIES member-state endpoint
/// `GET {base}/ms/{countryCode}/vat/{vatNumber}`.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ViesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ViesClient {
    /// Create a client whose every lookup is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ViesError::Transport` if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ViesError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViesError::Transport(describe(&e)))?;
        Ok(Self { http, base_url })
    }

    /// Upstream URL for `request`, with both parameters percent-encoded
    /// as single path segments.
    ///
    /// # Errors
    ///
    /// `ViesError::Transport` if the base URL cannot carry a path
    /// (e.g. `mailto:`).
    pub fn lookup_url(&self, request: &ValidationRequest) -> Result<Url, ViesError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ViesError::Transport(format!("base URL {} cannot carry a path", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["ms", request.country_code(), "vat", request.vat_number()]);
        }
        Ok(url)
    }

    /// Look `request` up in the registry. One attempt, no retries.
    ///
    /// # Errors
    ///
    /// See [`ViesError`] for how failures are classified.
    pub async fn check(&self, request: &ValidationRequest) -> Result<ViesPayload, ViesError> {
        info!("Verifying VAT: {}", request.lookup_key());

        let url = self.lookup_url(request)?;
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| failed(&e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| failed(&e))?;

        if !status.is_success() {
            let body = rejection_body(&body);
            error!(status = status.as_u16(), "VIES API error: {body}");
            return Err(ViesError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("VIES API response: {}", String::from_utf8_lossy(&body));
        Ok(ViesPayload::from_body(&body))
    }
}

fn failed(err: &reqwest::Error) -> ViesError {
    let err = ViesError::from_reqwest(err);
    error!("VIES API error: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> ViesClient {
        ViesClient::new(Url::parse(base).unwrap(), DEFAULT_TIMEOUT).unwrap()
    }

    fn request(cc: &str, number: &str) -> ValidationRequest {
        ValidationRequest::new(Some(cc), Some(number)).unwrap()
    }

    #[test]
    fn default_base_url_is_https() {
        assert!(DEFAULT_VIES_BASE_URL.starts_with("https://"));
    }

    #[test]
    fn lookup_url_appends_member_state_path() {
        let url = client(DEFAULT_VIES_BASE_URL)
            .lookup_url(&request("DE", "123456789"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ec.europa.eu/taxation_customs/vies/rest-api/ms/DE/vat/123456789"
        );
    }

    #[test]
    fn lookup_url_handles_trailing_slash_on_base() {
        let url = client("http://localhost:8080/vies/")
            .lookup_url(&request("FR", "12345678901"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/vies/ms/FR/vat/12345678901");
    }

    #[test]
    fn lookup_url_encodes_reserved_characters() {
        let url = client("http://localhost:8080")
            .lookup_url(&request("NL", "12 3/4?#"))
            .unwrap();
        assert_eq!(url.path(), "/ms/NL/vat/12%203%2F4%3F%23");
    }

    #[test]
    fn lookup_url_rejects_opaque_base() {
        let err = client("mailto:vat@example.com")
            .lookup_url(&request("DE", "1"))
            .unwrap_err();
        assert!(matches!(err, ViesError::Transport(_)));
    }

    #[test]
    fn payload_reads_known_fields() {
        let payload = ViesPayload::from_body(
            br#"{"valid":true,"traderName":"ACME GMBH","traderAddress":"MUSTERSTR 1","requestDate":"2024-01-15"}"#,
        );
        assert_eq!(payload.valid, Some(true));
        assert_eq!(payload.trader_name.as_deref(), Some("ACME GMBH"));
        assert_eq!(payload.trader_address.as_deref(), Some("MUSTERSTR 1"));
    }

    #[test]
    fn payload_without_valid_is_not_valid() {
        let result = ViesPayload::from_body(br#"{"traderName":"ACME"}"#).into_result();
        assert!(!result.valid);
        assert_eq!(result.trader_name.as_deref(), Some("ACME"));
    }

    #[test]
    fn payload_field_of_wrong_type_drops_only_that_field() {
        let payload = ViesPayload::from_body(
            br#"{"valid":true,"traderName":"ACME","traderAddress":{"street":"1 Main St"}}"#,
        );
        assert_eq!(payload.valid, Some(true));
        assert_eq!(payload.trader_name.as_deref(), Some("ACME"));
        assert_eq!(payload.trader_address, None);

        let payload = ViesPayload::from_body(br#"{"valid":"true","traderName":7}"#);
        assert_eq!(payload, ViesPayload::default());
    }

    #[test]
    fn unreadable_payload_is_not_valid() {
        let bodies: [&[u8]; 4] = [b"<html>oops</html>", b"null", b"[]", br#"{"valid":"yes"}"#];
        for body in bodies {
            assert_eq!(ViesPayload::from_body(body), ViesPayload::default());
        }
    }

    #[test]
    fn rejection_body_keeps_json_or_text() {
        assert_eq!(
            rejection_body(br#"{"message":"INVALID_INPUT"}"#),
            json!({ "message": "INVALID_INPUT" })
        );
        assert_eq!(rejection_body(b"Bad Gateway"), json!("Bad Gateway"));
        assert_eq!(rejection_body(b""), json!(""));
    }

    #[test]
    fn upstream_message_only_from_string_field() {
        let rejected = |body| ViesError::Rejected { status: 400, body };
        assert_eq!(
            rejected(json!({ "message": "INVALID_INPUT" })).upstream_message(),
            Some("INVALID_INPUT")
        );
        assert_eq!(rejected(json!({ "message": 42 })).upstream_message(), None);
        assert_eq!(rejected(json!({ "message": "" })).upstream_message(), None);
        assert_eq!(rejected(json!("INVALID_INPUT")).upstream_message(), None);
        assert_eq!(ViesError::Timeout.upstream_message(), None);
    }

    #[test]
    fn error_display() {
        let err = ViesError::Rejected {
            status: 503,
            body: json!({ "message": "MS_UNAVAILABLE" }),
        };
        assert_eq!(
            err.to_string(),
            r#"VIES rejected lookup with HTTP 503: {"message":"MS_UNAVAILABLE"}"#
        );
        assert_eq!(ViesError::Timeout.to_string(), "VIES lookup timed out");
    }
}
