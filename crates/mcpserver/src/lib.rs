//! `mcpserver`: a Rust library for building MCP (Model Context Protocol) servers.
//!
//! Implements the MCP 2025-03-26 tool surface as a pure protocol handler.
//! Define tools in JSON, register async handlers, then attach one or more
//! transports: newline-delimited stdio, the legacy SSE stream, or
//! streamable HTTP.
//!
//! # Quick start
//!
//! ```rust
//! use mcpserver::{Server, FnToolHandler, text_result, JsonRpcRequest};
//! use serde_json::Value;
//!
//! # async fn example() {
//! let mut server = Server::builder()
//!     .tools_json(r#"[{"name":"echo","description":"echoes","inputSchema":{"type":"object","properties":{"message":{"type":"string"}},"required":["message"]}}]"#.as_bytes())
//!     .server_info("my-server", "0.1.0")
//!     .build();
//!
//! server.handle_tool("echo", FnToolHandler::new(|args: Value| async move {
//!     let msg = args.get("message").and_then(|v| v.as_str()).unwrap_or("");
//!     Ok(text_result(msg))
//! }));
//!
//! let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
//! let resp = server.handle(req).await;
//! let json = serde_json::to_string(&resp).unwrap();
//! # }
//! ```

pub mod loader;
pub mod server;
pub mod transport_http;
pub mod transport_sse;
pub mod transport_stdio;
pub mod types;
mod validate;

// Re-export the most commonly used items at the crate root.
pub use loader::{load_tools, parse_tools};
pub use server::{FnToolHandler, Server, ServerBuilder, ToolHandler};
pub use transport_http::http_router;
pub use transport_sse::{SseOptions, SseTransport};
pub use transport_stdio::{serve_io, serve_stdio};
pub use types::{
    error_result, new_error_response, text_result, ContentBlock, EmbeddedResource,
    JsonRpcRequest, JsonRpcResponse, McpError, RpcError, Tool, ToolResult, ERR_CODE_BAD_PARAMS,
    ERR_CODE_INTERNAL, ERR_CODE_INVALID_REQ, ERR_CODE_NO_METHOD, ERR_CODE_PARSE,
    PROTOCOL_VERSION,
};
