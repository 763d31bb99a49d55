use axum::{
    Router,
    http::{HeaderValue, header},
    routing::get,
};
use tower_http::{
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use super::handlers;
use crate::vat::ViesClient;

/// CORS header values set on every response.
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub vies: ViesClient,
}

impl AppState {
    pub fn new(vies: ViesClient) -> Self {
        Self { vies }
    }
}

/// Build the gateway router.
///
/// All three CORS headers are set on every response, including
/// preflights, error answers, method-not-allowed and the fallback.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/vat",
            get(handlers::missing_parameters).options(handlers::preflight),
        )
        .route(
            "/vat/",
            get(handlers::missing_parameters).options(handlers::preflight),
        )
        .route(
            "/vat/{*path}",
            get(handlers::check_vat).options(handlers::preflight),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}
