//! HTTP surface: the JSON-RPC endpoint and a health check

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use lila::storage::{BaseStore, StoreMode};

use crate::error::{ServerError, ServerResult};
use crate::mcp::SERVER_NAME;
use crate::state::AppState;

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_endpoint))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// One JSON-RPC message per request; notifications are acknowledged with 202
async fn mcp_endpoint(State(state): State<Arc<AppState>>, body: Bytes) -> ServerResult<Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::BadRequest("Empty request body".to_string()));
    }

    match state.mcp.handle_message(&body).await {
        Some(response) => Ok(Json(response).into_response()),
        None => {
            debug!("Notification accepted");
            Ok(StatusCode::ACCEPTED.into_response())
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    store_mode: StoreMode,
    graph_connected: bool,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (store, mode) = state.handle.snapshot().await;
    let graph_connected = match mode {
        StoreMode::Graph => store.health_check().await.unwrap_or(false),
        StoreMode::Fallback => false,
    };

    Json(HealthResponse {
        status: "healthy",
        service: SERVER_NAME,
        version: crate::VERSION,
        store_mode: mode,
        graph_connected,
    })
}
