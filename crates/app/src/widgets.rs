//! Widget asset host: byte-for-byte static serving under `/widgets`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::tools::show::WIDGET_PAGE;

const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Widget pages present in `dir`, sorted. Falls back to the player page when
/// the directory is missing or holds no `.html` files.
pub fn available_widgets(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| name.ends_with(".html"))
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        tracing::warn!(path = %dir.display(), "no widget pages found; run tutorial-build");
        names.push(WIDGET_PAGE.to_string());
    }
    names.sort();
    names
}

#[derive(Debug, Clone)]
struct WidgetState {
    available: Arc<Vec<String>>,
}

/// `{scheme}://{host}` as the client addressed us.
fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

fn describe(page: &str) -> String {
    match page {
        WIDGET_PAGE => "YouTube video player widget".to_string(),
        other => format!("{} widget", other.trim_end_matches(".html")),
    }
}

async fn fix_html_content_type(mut resp: Response) -> Response {
    let is_html = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
        resp.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_UTF8));
    }
    resp
}

/// `/widgets` listing plus `/widgets/*` files served from `dir`.
/// Missing files are 404.
pub fn widget_router(dir: impl Into<PathBuf>, available: Vec<String>) -> Router {
    let state = WidgetState {
        available: Arc::new(available),
    };

    let widgets = Router::new()
        .route("/", get(handle_widget_list))
        .fallback_service(ServeDir::new(dir.into()))
        .layer(middleware::map_response(fix_html_content_type))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state);

    Router::new().nest("/widgets", widgets)
}

/// The standalone widget host: descriptor at `/` plus [`widget_router`].
pub fn widget_host_router(dir: impl Into<PathBuf>) -> Router {
    let dir = dir.into();
    let available = available_widgets(&dir);
    let state = WidgetState {
        available: Arc::new(available.clone()),
    };

    Router::new()
        .route("/", get(handle_host_index))
        .with_state(state)
        .merge(widget_router(dir, available))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
}

async fn handle_host_index(State(state): State<WidgetState>, headers: HeaderMap) -> impl IntoResponse {
    Json(json!({
        "name": "Tutorial Video Widget Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "widgetUrl": format!("{}/widgets", request_origin(&headers)),
        "availableWidgets": *state.available,
    }))
}

async fn handle_widget_list(State(state): State<WidgetState>, headers: HeaderMap) -> impl IntoResponse {
    let origin = request_origin(&headers);
    let widgets: Vec<_> = state
        .available
        .iter()
        .map(|page| {
            json!({
                "name": page.trim_end_matches(".html"),
                "url": format!("{}/widgets/{}", origin, page),
                "description": describe(page),
            })
        })
        .collect();
    Json(json!({ "widgets": widgets }))
}
