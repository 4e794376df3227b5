pub mod list;
pub mod show;

use std::sync::Arc;

use crate::bundle::BundleCache;

pub use list::{list_videos, ListingStyle};
pub use show::{resolve, show_video, ShowVideoArgs, WidgetDelivery};

pub const LIST_TOOL: &str = "list_tutorial_videos";
pub const SHOW_TOOL: &str = "show_tutorial_video";

/// Tool definitions served by every MCP front end.
pub const TOOLS_JSON: &[u8] = include_bytes!("../../tools.json");

/// How one MCP front end presents the catalog.
#[derive(Debug, Clone)]
pub struct ToolOptions {
    pub listing: ListingStyle,
    pub delivery: WidgetDelivery,
}

impl ToolOptions {
    /// Presentation for the stdio server. With a widget host configured the
    /// show tool links to its hosted page and listings are summarised.
    /// Otherwise the bundle is inlined and listings are full.
    pub fn for_stdio(widget_url: Option<&str>, bundle: BundleCache) -> Self {
        match widget_url {
            Some(base_url) => Self {
                listing: ListingStyle::default(),
                delivery: WidgetDelivery::Hosted {
                    base_url: base_url.to_string(),
                },
            },
            None => Self {
                listing: ListingStyle::Full,
                delivery: WidgetDelivery::Inline(bundle),
            },
        }
    }
}

/// Register all tool handlers on the given MCP server.
pub fn register_all(srv: &mut mcpserver::Server, options: ToolOptions) {
    list::register(srv, options.listing);
    show::register(srv, Arc::new(options.delivery));
}

/// Build an MCP server exposing the catalog tools.
pub fn build_server(name: &str, version: &str, options: ToolOptions) -> mcpserver::Server {
    let mut srv = mcpserver::Server::builder()
        .tools_json(TOOLS_JSON)
        .server_info(name, version)
        .build();

    register_all(&mut srv, options);
    srv
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpserver::{JsonRpcRequest, JsonRpcResponse, ERR_CODE_BAD_PARAMS, ERR_CODE_NO_METHOD};
    use serde_json::{json, Value};

    fn hosted_server() -> mcpserver::Server {
        build_server(
            "test-videos",
            "0.0.1",
            ToolOptions {
                listing: ListingStyle::default(),
                delivery: WidgetDelivery::Hosted {
                    base_url: "https://widgets.example.com".into(),
                },
            },
        )
    }

    async fn call_tool(srv: &mcpserver::Server, name: &str, args: Value) -> JsonRpcResponse {
        let req = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(1)),
            method: "tools/call".into(),
            params: Some(json!({
                "name": name,
                "arguments": args,
            })),
        };
        srv.handle(req).await
    }

    #[test]
    fn test_tool_definitions() {
        let srv = hosted_server();
        let names: Vec<&str> = srv.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![SHOW_TOOL, LIST_TOOL]);
        assert_eq!(srv.tools()[0].schema_meta.required, vec!["videoId"]);
    }

    #[tokio::test]
    async fn test_list_via_protocol() {
        let srv = hosted_server();
        let resp = call_tool(&srv, LIST_TOOL, json!({})).await;
        let text = resp.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.starts_with("Available Tutorial Videos:\n\n1. "));
        assert_eq!(text.matches("   Video ID: ").count(), 4);
    }

    #[tokio::test]
    async fn test_show_via_protocol() {
        let srv = hosted_server();
        let resp = call_tool(&srv, SHOW_TOOL, json!({"videoId": "Xpg2bnO_-eU"})).await;
        let result = resp.result.unwrap();
        assert_eq!(
            result["content"][0]["text"],
            "Here's the tutorial video: Introduction to Artificial Intelligence | Part 1"
        );
        let template = &result["_meta"]["openai"]["outputTemplate"];
        assert_eq!(template["url"], "https://widgets.example.com/widgets/video-player.html");
        assert_eq!(template["data"]["videoId"], "Xpg2bnO_-eU");
    }

    #[tokio::test]
    async fn test_show_missing_video_id_is_invalid_arguments() {
        let srv = hosted_server();
        let resp = call_tool(&srv, SHOW_TOOL, json!({})).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ERR_CODE_BAD_PARAMS);
        assert!(err.message.contains("videoId"));
    }

    #[tokio::test]
    async fn test_show_wrong_type_is_invalid_arguments() {
        let srv = hosted_server();
        let resp = call_tool(&srv, SHOW_TOOL, json!({"videoId": 12})).await;
        assert_eq!(resp.error.unwrap().code, ERR_CODE_BAD_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let srv = hosted_server();
        let resp = call_tool(&srv, "delete_tutorial_video", json!({})).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ERR_CODE_NO_METHOD);
        assert_eq!(err.message, "Unknown tool: delete_tutorial_video");
    }

    #[tokio::test]
    async fn test_inline_server_without_bundle() {
        let srv = build_server(
            "test-videos",
            "0.0.1",
            ToolOptions {
                listing: ListingStyle::Full,
                delivery: WidgetDelivery::Inline(BundleCache::unavailable()),
            },
        );
        let resp = call_tool(&srv, SHOW_TOOL, json!({"videoId": "Xpg2bnO_-eU"})).await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stdio_with_widget_host_links_hosted_page() {
        let options = ToolOptions::for_stdio(Some("https://widgets.example.com"), BundleCache::unavailable());
        assert!(matches!(options.listing, ListingStyle::Summary { max_chars: 100 }));
        let srv = build_server("test-videos", "0.0.1", options);

        let resp = call_tool(&srv, SHOW_TOOL, json!({"videoId": "PAKfEvJSLWA"})).await;
        let result = resp.result.unwrap();
        assert!(result.get("isError").is_none());
        assert_eq!(
            result["_meta"]["openai"]["outputTemplate"]["url"],
            "https://widgets.example.com/widgets/video-player.html"
        );

        let resp = call_tool(&srv, LIST_TOOL, json!({})).await;
        let text = resp.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
        assert_eq!(text.matches("...").count(), 4);
    }

    #[test]
    fn test_stdio_without_widget_host_inlines_bundle() {
        let options = ToolOptions::for_stdio(None, BundleCache::with_script("x"));
        assert!(matches!(options.listing, ListingStyle::Full));
        assert!(matches!(options.delivery, WidgetDelivery::Inline(_)));
    }
}
