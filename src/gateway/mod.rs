//! HTTP surface of the gateway.
//!
//! Routes:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/vat/{countryCode}/{vatNumber}` | lookup result or JSON error |
//! | `OPTIONS` | `/vat`, `/vat/...` | empty `200` |
//! | any | anything else | `404 {"error":"Not found"}` |
//!
//! Every response carries permissive CORS headers.

mod error;
mod handlers;
mod router;

pub use error::{
    ApiError, REJECTED_FALLBACK_MESSAGE, ServeError, TIMEOUT_MESSAGE, TRANSPORT_MESSAGE,
};
pub use router::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, AppState, build_router};

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::vat::ViesClient;

/// Bind to `config.bind_addr` and serve until SIGINT/SIGTERM.
///
/// # Errors
///
/// [`ServeError`] if the VIES client cannot be built or the socket cannot
/// be bound or served.
pub async fn serve(config: GatewayConfig) -> Result<(), ServeError> {
    let vies = ViesClient::new(config.vies_base_url.clone(), config.upstream_timeout)?;
    let app = build_router(AppState::new(vies));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "VAT gateway listening on {} (upstream {}, timeout {:?})",
        listener.local_addr()?,
        config.vies_base_url,
        config.upstream_timeout
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;
    info!("VAT gateway stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("cannot install signal handlers, graceful shutdown disabled: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for Ctrl-C, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
