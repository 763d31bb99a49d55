use thiserror::Error;

/// Errors raised while turning an inbound URL path into a
/// [`ValidationRequest`](super::ValidationRequest).
///
/// The `Display` text of each variant is what callers see in the
/// `error` field of the JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RequestError {
    /// Country code or VAT number is absent or empty.
    #[error("Missing required parameters: countryCode and vatNumber")]
    MissingParameters,

    /// A path parameter is not valid percent-encoded UTF-8.
    #[error("Invalid encoding in path parameters: countryCode and vatNumber must be UTF-8")]
    InvalidEncoding,

    /// The path has more segments than `/vat/{countryCode}/{vatNumber}`.
    #[error("Not found")]
    UnknownPath,
}
