//! HTTP surface for Parley.
//!
//! Exposes the negotiator over four JSON routes and serves them on a
//! caller-provided listener.

mod error;
pub mod handlers;

pub use error::ApiError;
pub use handlers::AppState;

use axum::Router;
use axum::routing::{get, post};
use log::{info, warn};
use parley_rs_core::Negotiator;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build the router with the negotiator as shared state.
pub fn build_router(negotiator: Arc<Negotiator>) -> Router {
    Router::new()
        .route("/negotiate", post(handlers::negotiate))
        .route(
            "/negotiate-conversation",
            post(handlers::negotiate_conversation),
        )
        .route("/end-conversation", post(handlers::end_conversation))
        .route("/health", get(handlers::health))
        .with_state(negotiator)
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    match listener.local_addr() {
        Ok(addr) => info!("parley server listening (addr={})", addr),
        Err(err) => warn!("listener address unavailable (error={})", err),
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("parley server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal (error={})", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
