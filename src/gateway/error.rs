use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::{ErrorBody, RequestError};
use crate::vat::ViesError;

/// `error` text for a rejection whose body has no `message` string.
pub const REJECTED_FALLBACK_MESSAGE: &str = "Failed to verify VAT number";
/// `error` text for an upstream timeout (504).
pub const TIMEOUT_MESSAGE: &str = "VIES service timeout. Please try again.";
/// `error` text for any other upstream fault (500).
pub const TRANSPORT_MESSAGE: &str = "Failed to connect to VIES service";

/// A failed lookup as seen by the HTTP layer.
///
/// This is the only place response statuses for failures are chosen.
/// A rejection keeps the upstream status; one that is not a valid HTTP
/// status code is answered with `502 Bad Gateway`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Upstream(#[from] ViesError),
}

impl ApiError {
    /// Status and JSON body this error is answered with.
    pub fn to_parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Request(e @ (RequestError::MissingParameters | RequestError::InvalidEncoding)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string()))
            }
            Self::Request(e @ RequestError::UnknownPath) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(e.to_string()))
            }
            Self::Upstream(e @ ViesError::Rejected { status, body }) => {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                let error = e.upstream_message().unwrap_or(REJECTED_FALLBACK_MESSAGE);
                (status, ErrorBody::new(error).with_details(body.clone()))
            }
            Self::Upstream(ViesError::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, ErrorBody::new(TIMEOUT_MESSAGE))
            }
            Self::Upstream(ViesError::Transport(description)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(TRANSPORT_MESSAGE).with_message(description.clone()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();
        (status, Json(body)).into_response()
    }
}

/// Errors that stop the gateway process from starting or serving.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build VIES client: {0}")]
    Client(#[from] ViesError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_parameters_is_bad_request() {
        let (status, body) = ApiError::from(RequestError::MissingParameters).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.error,
            "Missing required parameters: countryCode and vatNumber"
        );
        assert!(body.details.is_none() && body.message.is_none());
    }

    #[test]
    fn invalid_encoding_is_bad_request() {
        let (status, body) = ApiError::from(RequestError::InvalidEncoding).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, ErrorBody::new(RequestError::InvalidEncoding.to_string()));
    }

    #[test]
    fn rejection_with_empty_message_uses_fallback() {
        let err = ViesError::Rejected {
            status: 400,
            body: json!({ "message": "" }),
        };
        let (status, body) = ApiError::from(err).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, REJECTED_FALLBACK_MESSAGE);
        assert_eq!(body.details, Some(json!({ "message": "" })));
    }

    #[test]
    fn rejection_with_out_of_range_status_is_bad_gateway() {
        let err = ViesError::Rejected {
            status: 1000,
            body: json!(""),
        };
        let (status, _) = ApiError::from(err).to_parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let (status, body) = ApiError::from(RequestError::UnknownPath).to_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, ErrorBody::new("Not found"));
    }

    #[test]
    fn rejection_keeps_upstream_status_and_body() {
        let err = ViesError::Rejected {
            status: 400,
            body: json!({ "message": "INVALID_INPUT" }),
        };
        let (status, body) = ApiError::from(err).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "error": "INVALID_INPUT", "details": { "message": "INVALID_INPUT" } })
        );
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let err = ViesError::Rejected {
            status: 503,
            body: json!({ "errorWrappers": [{ "error": "MS_UNAVAILABLE" }] }),
        };
        let (status, body) = ApiError::from(err).to_parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error, REJECTED_FALLBACK_MESSAGE);
        assert_eq!(
            body.details,
            Some(json!({ "errorWrappers": [{ "error": "MS_UNAVAILABLE" }] }))
        );
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let (status, body) = ApiError::from(ViesError::Timeout).to_parts();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, ErrorBody::new("VIES service timeout. Please try again."));
    }

    #[test]
    fn transport_failure_is_internal_error_with_description() {
        let err = ViesError::Transport("connection refused".into());
        let (status, body) = ApiError::from(err).to_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            ErrorBody::new("Failed to connect to VIES service").with_message("connection refused")
        );
    }

    #[test]
    fn response_is_json() {
        let response = ApiError::from(ViesError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
