//! Axum HTTP surface for the relay.

use crate::adapter::RequestAdapter;
use crate::models::RelayResponse;
use crate::{Error, Result};
use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Path the relay listens on.
pub const RELAY_PATH: &str = "/mcp";

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<RequestAdapter>,
}

pub fn router(adapter: RequestAdapter) -> Router {
    let state = AppState {
        adapter: Arc::new(adapter),
    };

    Router::new()
        .route(RELAY_PATH, post(handle_relay))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Relay listening on http://{}{}", listener.local_addr()?, RELAY_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// Body is taken as text whatever the content type.
async fn handle_relay(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>> {
    let body = String::from_utf8(body.to_vec()).map_err(|e| {
        tracing::warn!("Rejected request body that is not UTF-8: {}", e);
        Error::Parse(format!("request body is not valid UTF-8: {}", e))
    })?;

    let text = state.adapter.handle(&body).await.map_err(|e| {
        tracing::error!("Relay request failed ({}): {}", e.kind(), e);
        e
    })?;

    Ok(Json(RelayResponse::new(text)))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
