//! HTTP server for the signoff console.

use axum::{Extension, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

mod handlers;
mod health;
pub mod html;

pub use handlers::not_found_handler;

use crate::{ServiceConfig, ServiceState};

const STATUS_PREFIX: &str = "/_status";

/// The full HTML router, without tracing.
pub fn router(config: ServiceConfig, state: ServiceState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .merge(html::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(Extension(config))
        .with_state(state)
}

/// Run the HTML server
pub async fn run_html(
    config: ServiceConfig,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    if config.read_only {
        tracing::info!("HTML UI is read-only, workflow actions are hidden");
    }

    let html_router = router(config, state).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "HTML server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, html_router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
