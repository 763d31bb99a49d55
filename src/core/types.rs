use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::error::RequestError;

/// A VAT lookup key taken from the inbound URL path.
///
/// Both parts are guaranteed non-empty; construction is the only place
/// the missing-parameter check happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    country_code: String,
    vat_number: String,
}

impl ValidationRequest {
    /// Build a request from optional path parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingParameters`] if either part is `None`
    /// or empty.
    pub fn new(country_code: Option<&str>, vat_number: Option<&str>) -> Result<Self, RequestError> {
        match (country_code, vat_number) {
            (Some(cc), Some(number)) if !cc.is_empty() && !number.is_empty() => Ok(Self {
                country_code: cc.to_string(),
                vat_number: number.to_string(),
            }),
            _ => Err(RequestError::MissingParameters),
        }
    }

    /// Parse the raw, still percent-encoded remainder of a `/vat/...` path,
    /// e.g. `"DE/123456789"`.
    ///
    /// The path is split on `/` before each segment is decoded, so an
    /// encoded slash (`%2F`) stays inside its parameter. Trailing slashes
    /// are ignored and empty segments count as missing.
    ///
    /// # Errors
    ///
    /// [`RequestError::InvalidEncoding`] if a segment does not decode to
    /// UTF-8, [`RequestError::UnknownPath`] if a third segment follows the
    /// VAT number, otherwise [`RequestError::MissingParameters`] as for
    /// [`ValidationRequest::new`].
    pub fn from_path(path: &str) -> Result<Self, RequestError> {
        let mut segments = path.trim_end_matches('/').split('/');
        let country_code = segments.next().map(decode_segment).transpose()?;
        let vat_number = segments.next().map(decode_segment).transpose()?;
        if segments.next().is_some() {
            return Err(RequestError::UnknownPath);
        }
        Self::new(country_code.as_deref(), vat_number.as_deref())
    }

    /// Two-letter country code as given by the caller.
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// VAT number without the country prefix.
    pub fn vat_number(&self) -> &str {
        &self.vat_number
    }

    /// Country code and number concatenated, e.g. `DE123456789`.
    pub fn lookup_key(&self) -> String {
        format!("{}{}", self.country_code, self.vat_number)
    }
}

fn decode_segment(raw: &str) -> Result<Cow<'_, str>, RequestError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| RequestError::InvalidEncoding)
}

/// Successful lookup as returned to gateway callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the registry confirmed the number.
    pub valid: bool,
    /// Registered trader name, verbatim from the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trader_name: Option<String>,
    /// Registered trader address, verbatim from the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trader_address: Option<String>,
    /// When the gateway produced this response.
    #[serde(serialize_with = "serialize_millis")]
    pub request_date: DateTime<Utc>,
}

impl ValidationResult {
    /// Build a result stamped with the current time.
    pub fn issued_now(
        valid: bool,
        trader_name: Option<String>,
        trader_address: Option<String>,
    ) -> Self {
        Self {
            valid,
            trader_name,
            trader_address,
            request_date: Utc::now(),
        }
    }
}

fn serialize_millis<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// JSON body of every failure response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error, always present.
    pub error: String,
    /// Raw upstream payload for upstream rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Underlying fault description for transport failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Body carrying only the `error` text.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            message: None,
        }
    }

    /// Attach the raw upstream payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the underlying fault description.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
