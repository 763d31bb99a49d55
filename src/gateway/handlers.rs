use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};

use super::error::ApiError;
use super::router::AppState;
use crate::core::{RequestError, ValidationRequest, ValidationResult};

const VAT_PREFIX: &str = "/vat/";

/// `GET /vat/{countryCode}/{vatNumber}`.
///
/// Everything after `/vat/` is parsed from the raw request path, so
/// incomplete paths still land here and get a 400 instead of a 404, and
/// `%2F` inside a parameter does not split it.
pub async fn check_vat(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<ValidationResult>, ApiError> {
    let params = uri.path().strip_prefix(VAT_PREFIX).unwrap_or_default();
    let request = ValidationRequest::from_path(params)?;
    let payload = state.vies.check(&request).await?;
    Ok(Json(payload.into_result()))
}

/// `GET /vat` with no parameters at all.
pub async fn missing_parameters() -> ApiError {
    RequestError::MissingParameters.into()
}

/// CORS preflight: empty 200. Headers come from the router layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Router fallback: `404 {"error":"Not found"}`.
pub async fn not_found() -> ApiError {
    RequestError::UnknownPath.into()
}
