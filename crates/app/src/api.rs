//! REST front end over the catalog.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bundle::BundleCache;
use crate::catalog::{catalog, VideoRecord};
use crate::embed::embed;
use crate::player::{bundle_unavailable_page, not_found_page, render_player_page};

/// Shared state for the REST handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub bundle: BundleCache,
}

/// A catalog record as the REST API shows it, with its watch URL.
#[derive(Debug, Serialize)]
struct VideoJson<'a> {
    #[serde(flatten)]
    record: &'a VideoRecord,
    url: String,
}

impl<'a> From<&'a VideoRecord> for VideoJson<'a> {
    fn from(record: &'a VideoRecord) -> Self {
        Self {
            record,
            url: record.watch_url(),
        }
    }
}

/// Create the REST router.
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/videos", get(handle_list))
        .route("/api/videos/{id}", get(handle_get))
        .route("/api/embed/{id}", get(handle_embed))
        .route("/api/player/{id}", get(handle_player))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Endpoint lines logged at startup.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET  /", "API info"),
    ("GET  /api/videos", "List all videos"),
    ("GET  /api/videos/:id", "Get video details"),
    ("GET  /api/embed/:id", "Get embed code"),
    ("GET  /api/player/:id", "View video player"),
];

async fn handle_index() -> impl IntoResponse {
    Json(json!({
        "name": "Tutorial Video API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API for displaying tutorial videos",
        "endpoints": {
            "videos": "/api/videos",
            "videoById": "/api/videos/:id",
            "embed": "/api/embed/:id",
            "player": "/api/player/:id",
        },
    }))
}

async fn handle_list() -> impl IntoResponse {
    let videos: Vec<VideoJson> = catalog().iter().map(VideoJson::from).collect();
    Json(json!({
        "success": true,
        "count": videos.len(),
        "videos": videos,
    }))
}

async fn handle_get(Path(id): Path<String>) -> Response {
    match catalog().find(&id) {
        Some(video) => Json(json!({
            "success": true,
            "video": VideoJson::from(video),
        }))
        .into_response(),
        None => {
            tracing::debug!(video_id = %id, "video not found");
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "error": "Video not found",
                    "availableIds": catalog().ids(),
                })),
            )
                .into_response()
        }
    }
}

async fn handle_embed(Path(id): Path<String>) -> Response {
    let Some(video) = catalog().find(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "Video not found",
            })),
        )
            .into_response();
    };

    let embed = embed(&video.id);
    Json(json!({
        "success": true,
        "video": VideoJson::from(video),
        "embedCode": embed.embed_code,
        "embedUrl": embed.embed_url,
    }))
    .into_response()
}

async fn handle_player(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let Some(video) = catalog().find(&id) else {
        return (StatusCode::NOT_FOUND, Html(not_found_page(&id))).into_response();
    };

    let Some(script) = state.bundle.script() else {
        tracing::warn!(video_id = %id, "player requested without bundle");
        return (StatusCode::INTERNAL_SERVER_ERROR, Html(bundle_unavailable_page())).into_response();
    };

    (
        [(header::CONTENT_TYPE, "text/html")],
        render_player_page(video, script),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(bundle: BundleCache) -> Router {
        api_router(ApiState { bundle })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = get(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_index() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Tutorial Video API");
        assert_eq!(body["endpoints"]["player"], "/api/player/:id");
    }

    #[tokio::test]
    async fn test_list_videos() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/api/videos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 4);
        assert_eq!(body["videos"][0]["id"], "Xpg2bnO_-eU");
        assert_eq!(body["videos"][0]["url"], "https://youtu.be/Xpg2bnO_-eU");
        assert_eq!(body["videos"][3]["id"], "ng5lAQay4qI");
    }

    #[tokio::test]
    async fn test_get_video() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/api/videos/PAKfEvJSLWA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video"]["title"], "Prompt Engineering Part 1 - Key Components");
    }

    #[tokio::test]
    async fn test_get_video_not_found_lists_ids() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/api/videos/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Video not found");
        assert_eq!(body["availableIds"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_embed() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/api/embed/Xpg2bnO_-eU").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embedUrl"], "https://www.youtube.com/embed/Xpg2bnO_-eU");
        assert!(body["embedCode"]
            .as_str()
            .unwrap()
            .contains("src=\"https://www.youtube.com/embed/Xpg2bnO_-eU\""));
        assert_eq!(body["video"]["id"], "Xpg2bnO_-eU");
    }

    #[tokio::test]
    async fn test_embed_not_found() {
        let (status, body) = get_json(app(BundleCache::unavailable()), "/api/embed/XPG2BNO_-EU").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("availableIds").is_none());
    }

    #[tokio::test]
    async fn test_player_page() {
        let bundle = BundleCache::with_script("customElements.define('tutorial-video-player',class extends HTMLElement{});");
        let (status, content_type, body) = get(app(bundle), "/api/player/ng5lAQay4qI").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("video-id=\"ng5lAQay4qI\""));
        assert!(body.contains("customElements.define('tutorial-video-player'"));
    }

    #[tokio::test]
    async fn test_player_unknown_id() {
        let bundle = BundleCache::with_script("x");
        let (status, content_type, body) = get(app(bundle), "/api/player/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("Video ID: missing"));
    }

    #[tokio::test]
    async fn test_player_without_bundle_is_degraded() {
        let (status, _, body) = get(app(BundleCache::unavailable()), "/api/player/Xpg2bnO_-eU").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Web component not loaded"));
        assert!(!body.contains("tutorial-video-player"));
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let req = Request::builder()
            .uri("/api/videos")
            .header("origin", "https://chat.example.com")
            .body(Body::empty())
            .unwrap();
        let resp = app(BundleCache::unavailable()).oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }
}
