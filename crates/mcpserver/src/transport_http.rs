use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::server::Server;
use crate::types::JsonRpcRequest;

const SESSION_HEADER: &str = "mcp-session-id";

/// Shared state for the streamable HTTP handler.
pub(crate) struct HttpState {
    server: Arc<Server>,
    sessions: RwLock<HashSet<String>>,
}

/// Create an Axum router serving `POST /mcp`, `DELETE /mcp` and `GET /healthz`.
pub fn http_router(server: Arc<Server>) -> Router {
    let state = Arc::new(HttpState {
        server,
        sessions: RwLock::new(HashSet::new()),
    });

    Router::new()
        .route("/mcp", post(handle_mcp).delete(handle_delete))
        .route("/healthz", get(handle_healthz))
        .with_state(state)
}

async fn handle_healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Session teardown. Ids issued by `initialize` are held until the client
/// deletes them.
async fn handle_delete(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> StatusCode {
    let Some(id) = headers.get(SESSION_HEADER).and_then(|h| h.to_str().ok()) else {
        return StatusCode::BAD_REQUEST;
    };
    if state.sessions.write().await.remove(id) {
        tracing::info!(session_id = %id, "streamable http session closed");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn handle_mcp(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    // Session management: create on initialize, echo back afterwards.
    let session_id = if req.method == "initialize" {
        let id = Uuid::new_v4().to_string();
        state.sessions.write().await.insert(id.clone());
        tracing::info!(session_id = %id, "streamable http session created");
        Some(id)
    } else if let Some(id) = headers.get(SESSION_HEADER).and_then(|h| h.to_str().ok()) {
        // Unknown sessions are still served; the server itself is stateless.
        if !state.sessions.read().await.contains(id) {
            tracing::debug!(session_id = %id, "request for unknown session");
        }
        Some(id.to_string())
    } else {
        None
    };

    let resp = state.server.handle(req).await;

    // Notification: return 202 with no body.
    if resp.is_notification() {
        return (StatusCode::ACCEPTED, Body::empty()).into_response();
    }

    let mut response = Json(&resp).into_response();

    // Attach session ID header.
    if let Some(value) = session_id.and_then(|sid| HeaderValue::from_str(&sid).ok()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }

    response
}
