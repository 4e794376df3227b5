use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mcpserver::{error_result, text_result, ContentBlock, EmbeddedResource, McpError, ToolHandler, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::bundle::BundleCache;
use crate::catalog::{Catalog, VideoRecord};
use crate::player::render_player_page;

const DEFAULT_TITLE: &str = "Tutorial Video";

/// Widget page name on the asset host.
pub const WIDGET_PAGE: &str = "video-player.html";

/// Where the rendered player reaches the client.
#[derive(Debug, Clone)]
pub enum WidgetDelivery {
    /// Whole player page inlined as a `data:` URI resource.
    Inline(BundleCache),
    /// Reference to the widget page on an external asset host.
    Hosted { base_url: String },
}

/// Arguments of `show_tutorial_video`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowVideoArgs {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

struct ShowVideoHandler {
    delivery: Arc<WidgetDelivery>,
}

#[async_trait]
impl ToolHandler for ShowVideoHandler {
    async fn call(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: ShowVideoArgs =
            serde_json::from_value(args).map_err(|e| McpError::Validation(e.to_string()))?;
        Ok(show_video(crate::catalog::catalog(), &args, &self.delivery))
    }
}

pub fn register(srv: &mut mcpserver::Server, delivery: Arc<WidgetDelivery>) {
    srv.handle_tool(super::SHOW_TOOL, Arc::new(ShowVideoHandler { delivery }));
}

/// Effective record for `args`: caller override, else catalog value, else
/// the fallback. Empty overrides count as absent. Unknown ids still resolve.
pub fn resolve(catalog: &Catalog, args: &ShowVideoArgs) -> VideoRecord {
    let known = catalog.find(&args.video_id);
    let pick = |given: &Option<String>, from_catalog: Option<&str>, fallback: &str| -> String {
        given
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(from_catalog.filter(|s| !s.is_empty()))
            .unwrap_or(fallback)
            .to_string()
    };

    let title = pick(&args.title, known.map(|v| v.title.as_ref()), DEFAULT_TITLE);
    let description = pick(&args.description, known.map(|v| v.description.as_ref()), "");
    VideoRecord::new(args.video_id.clone(), title, description)
}

/// Resolve `args` and build the tool result for `delivery`.
pub fn show_video(catalog: &Catalog, args: &ShowVideoArgs, delivery: &WidgetDelivery) -> ToolResult {
    let video = resolve(catalog, args);
    tracing::info!(video_id = %video.id, known = catalog.find(&video.id).is_some(), "show video");

    match delivery {
        WidgetDelivery::Inline(bundle) => {
            let Some(script) = bundle.script() else {
                return error_result(
                    "Error: Web component not loaded. Run the asset build step (tutorial-build) first.",
                );
            };
            let page = render_player_page(&video, script);
            text_result(format!("Displaying tutorial video: {}", video.title)).with_content(
                ContentBlock::Resource {
                    resource: EmbeddedResource {
                        uri: format!("data:text/html;base64,{}", STANDARD.encode(page)),
                        mime_type: "text/html".into(),
                        title: Some(video.title.to_string()),
                    },
                },
            )
        }
        WidgetDelivery::Hosted { base_url } => {
            let url = format!("{}/widgets/{}", base_url.trim_end_matches('/'), WIDGET_PAGE);
            text_result(format!("Here's the tutorial video: {}", video.title)).with_meta(json!({
                "openai": {
                    "outputTemplate": {
                        "type": "html",
                        "url": url,
                        "data": {
                            "videoId": video.id,
                            "title": video.title,
                            "description": video.description,
                        },
                    },
                },
            }))
        }
    }
}
