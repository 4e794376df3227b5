//! Legacy MCP SSE transport.
//!
//! `GET /sse` opens a long-lived event stream and announces, through an
//! `endpoint` event, the URL the client must POST its JSON-RPC messages to.
//! Responses travel back over the stream as `message` events. A session
//! lives exactly as long as its stream: it is released when the client
//! disconnects or when a response can no longer be delivered.

use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::server::Server;
use crate::types::JsonRpcRequest;

/// Events buffered per session before a POST waits on the client.
const SESSION_BUFFER: usize = 32;

/// Options for [`SseTransport`].
#[derive(Debug, Clone)]
pub struct SseOptions {
    /// Path announced in the `endpoint` event and accepted for POSTs.
    pub message_path: String,
    /// Include internal error detail in error bodies.
    pub expose_error_details: bool,
    /// Interval between keep-alive comments.
    pub keep_alive: Duration,
}

impl Default for SseOptions {
    fn default() -> Self {
        Self {
            message_path: "/messages".into(),
            expose_error_details: false,
            keep_alive: Duration::from_secs(15),
        }
    }
}

pub(crate) struct SseState {
    server: Arc<Server>,
    sessions: RwLock<HashMap<String, mpsc::Sender<Event>>>,
    options: SseOptions,
}

impl SseState {
    async fn remove_session(&self, session_id: &str, reason: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            tracing::info!(session_id, reason, "sse session closed");
        }
    }

    fn error_response(&self, status: StatusCode, message: &str, detail: Option<String>) -> Response {
        let mut body = json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });
        if self.options.expose_error_details {
            if let Some(detail) = detail {
                body["details"] = json!(detail);
            }
        }
        (status, Json(body)).into_response()
    }
}

/// SSE transport over a shared [`Server`].
#[derive(Clone)]
pub struct SseTransport {
    state: Arc<SseState>,
}

impl SseTransport {
    pub fn new(server: Arc<Server>, options: SseOptions) -> Self {
        Self {
            state: Arc::new(SseState {
                server,
                sessions: RwLock::new(HashMap::new()),
                options,
            }),
        }
    }

    /// Router serving `GET /sse` and the POST message endpoint.
    ///
    /// POSTs to `/sse?sessionId=…` are accepted as well, for clients that
    /// post back to the stream URL.
    pub fn router(&self) -> Router {
        let mut router = Router::new().route("/sse", get(open_stream).post(post_message));
        if self.state.options.message_path != "/sse" {
            router = router.route(&self.state.options.message_path, post(post_message));
        }
        router.with_state(Arc::clone(&self.state))
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.state.sessions.read().await.len()
    }
}

/// Removes its session from the table when the stream is dropped.
struct SessionGuard {
    session_id: String,
    state: Arc<SseState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = std::mem::take(&mut self.session_id);
        let state = Arc::clone(&self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.remove_session(&session_id, "client disconnected").await;
                });
            }
            Err(_) => tracing::debug!(session_id, "runtime gone, session not removed"),
        }
    }
}

struct SessionStream {
    events: ReceiverStream<Event>,
    _guard: SessionGuard,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.events).poll_next(cx).map(|event| event.map(Ok))
    }
}

async fn open_stream(State(state): State<Arc<SseState>>) -> impl IntoResponse {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<Event>(SESSION_BUFFER);

    let endpoint = format!("{}?sessionId={}", state.options.message_path, session_id);
    // Fresh channel with spare capacity, these cannot fail.
    let _ = tx.try_send(Event::default().comment("connected"));
    let _ = tx.try_send(Event::default().event("endpoint").data(endpoint));

    state.sessions.write().await.insert(session_id.clone(), tx);
    tracing::info!(session_id = %session_id, "sse session opened");

    let stream = SessionStream {
        events: ReceiverStream::new(rx),
        _guard: SessionGuard {
            session_id,
            state: Arc::clone(&state),
        },
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.options.keep_alive))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    #[serde(default)]
    session_id: Option<String>,
}

async fn post_message(
    State(state): State<Arc<SseState>>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id else {
        return state.error_response(StatusCode::BAD_REQUEST, "Missing sessionId parameter", None);
    };

    let sender = state.sessions.read().await.get(&session_id).cloned();
    let Some(sender) = sender else {
        tracing::warn!(session_id = %session_id, "message for unknown sse session");
        return state.error_response(StatusCode::NOT_FOUND, "Session not found", None);
    };

    let req: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return state.error_response(
                StatusCode::BAD_REQUEST,
                "Invalid JSON-RPC message",
                Some(e.to_string()),
            )
        }
    };

    tracing::debug!(session_id = %session_id, method = %req.method, "sse message");
    let resp = state.server.handle(req).await;

    if !resp.is_notification() {
        let event = match Event::default().event("message").json_data(&resp) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "encode sse response");
                return state.error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(e.to_string()),
                );
            }
        };

        // Never wait on a client that has stopped reading its stream.
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                state.remove_session(&session_id, "stream not drained").await;
                return state.error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Session stream is not being read",
                    None,
                );
            }
            Err(TrySendError::Closed(_)) => {
                state.remove_session(&session_id, "delivery failed").await;
                return state.error_response(StatusCode::GONE, "Session closed", None);
            }
        }
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
