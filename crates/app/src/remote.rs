//! Remote MCP front end: SSE and streamable HTTP transports over one shared
//! server, with the widget pages it references served alongside.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use mcpserver::{SseOptions, SseTransport};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::widgets::{available_widgets, widget_router};

pub const SERVER_NAME: &str = "Gradeless - Tutorial Video MCP Server";

/// Settings for [`remote_router`].
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    /// Externally reachable base URL, used in the descriptor.
    pub base_url: String,
    pub widgets_dir: PathBuf,
    pub sse: SseOptions,
}

#[derive(Debug, Clone)]
struct RemoteState {
    base_url: Arc<str>,
    available: Arc<Vec<String>>,
}

/// Build the remote router. Returns the SSE transport as well so the
/// caller can observe its sessions.
pub fn remote_router(server: Arc<mcpserver::Server>, options: RemoteOptions) -> (Router, SseTransport) {
    let sse = SseTransport::new(Arc::clone(&server), options.sse);
    let available = available_widgets(&options.widgets_dir);
    let state = RemoteState {
        base_url: options.base_url.trim_end_matches('/').into(),
        available: Arc::new(available.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let router = Router::new()
        .route("/", get(handle_index))
        .with_state(state)
        .merge(sse.router())
        .merge(mcpserver::http_router(server))
        .merge(widget_router(options.widgets_dir, available))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (router, sse)
}

async fn handle_index(State(state): State<RemoteState>) -> impl IntoResponse {
    Json(json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "mcp": {
            "endpoint": format!("{}/sse", state.base_url),
            "protocol": "Model Context Protocol",
            "transport": "SSE",
        },
        "widgets": {
            "endpoint": format!("{}/widgets", state.base_url),
            "available": *state.available,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{build_server, ListingStyle, ToolOptions, WidgetDelivery};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(widgets_dir: PathBuf) -> Router {
        let server = build_server(
            "test-remote",
            "0.0.1",
            ToolOptions {
                listing: ListingStyle::default(),
                delivery: WidgetDelivery::Hosted {
                    base_url: "https://videos.example.com".into(),
                },
            },
        );
        let (router, _) = remote_router(
            Arc::new(server),
            RemoteOptions {
                base_url: "https://videos.example.com/".into(),
                widgets_dir,
                sse: SseOptions::default(),
            },
        );
        router
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app(dir.path().to_path_buf()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["name"], SERVER_NAME);
        assert_eq!(body["status"], "running");
        assert_eq!(body["mcp"]["endpoint"], "https://videos.example.com/sse");
        assert_eq!(body["mcp"]["transport"], "SSE");
        assert_eq!(body["widgets"]["endpoint"], "https://videos.example.com/widgets");
        assert_eq!(body["widgets"]["available"], json!(["video-player.html"]));
    }

    #[tokio::test]
    async fn test_streamable_http_tools_list() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#))
            .unwrap();
        let resp = app(dir.path().to_path_buf()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_serves_widget_pages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("video-player.html"), "<html></html>").unwrap();
        let req = Request::builder()
            .uri("/widgets/video-player.html")
            .body(Body::empty())
            .unwrap();
        let resp = app(dir.path().to_path_buf()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_unknown_session_post() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/messages?sessionId=gone")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap();
        let resp = app(dir.path().to_path_buf()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/messages")
            .header("origin", "https://chat.example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app(dir.path().to_path_buf()).oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
