use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::loader;
use crate::types::*;

/// Handler trait for MCP tools. Implement this or use closures.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<ToolResult, McpError>;
}

/// Wraps an async closure into a ToolHandler.
pub struct FnToolHandler<F> {
    f: F,
}

impl<F, Fut> FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, McpError>> + Send + 'static,
{
    pub fn new(f: F) -> Arc<dyn ToolHandler> {
        Arc::new(Self { f })
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, McpError>> + Send + 'static,
{
    async fn call(&self, args: Value) -> Result<ToolResult, McpError> {
        (self.f)(args).await
    }
}

/// The MCP server. Create with `ServerBuilder`, register handlers, then hand
/// it to a transport.
///
/// The server holds no per-client state, so one instance can be shared
/// (behind an `Arc`) by every session of every transport.
pub struct Server {
    pub(crate) server_name: String,
    pub(crate) server_version: String,
    pub(crate) tools: HashMap<String, Tool>,
    pub(crate) tool_list: Vec<Tool>,
    pub(crate) tool_handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl Server {
    /// Create a new server builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Register a tool handler.
    pub fn handle_tool(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.tool_handlers.insert(name.into(), handler);
    }

    /// Server name advertised in `initialize`.
    pub fn name(&self) -> &str {
        &self.server_name
    }

    /// Tool definitions in registration order.
    pub fn tools(&self) -> &[Tool] {
        &self.tool_list
    }

    /// Route a JSON-RPC request to the appropriate MCP handler.
    pub async fn handle(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if req.jsonrpc != "2.0" {
            return new_error_response(req.id, ERR_CODE_INVALID_REQ, "jsonrpc must be '2.0'");
        }

        if req.method.starts_with("notifications/") {
            tracing::debug!(method = %req.method, "notification");
            return notification_response();
        }

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "ping" => self.handle_ping(req),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req).await,
            _ => new_error_response(
                req.id,
                ERR_CODE_NO_METHOD,
                format!("Method not found: {}", req.method),
            ),
        }
    }

    fn handle_initialize(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if let Some(params) = &req.params {
            if let Ok(p) = serde_json::from_value::<InitializeParams>(params.clone()) {
                let client_name = p.client_info.as_ref().map_or("", |c| c.name.as_str());
                let client_version = p.client_info.as_ref().map_or("", |c| c.version.as_str());
                tracing::info!(
                    client_name,
                    client_version,
                    protocol_version = ?p.protocol_version,
                    "initialize"
                );
            }
        }

        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {"listChanged": false},
            },
            "serverInfo": {
                "name": self.server_name,
                "version": self.server_version,
            },
        });

        new_ok_response(req.id, result)
    }

    fn handle_ping(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        new_ok_response(req.id, json!({}))
    }

    fn handle_tools_list(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(count = self.tool_list.len(), "tools/list");
        let result = json!({ "tools": self.tool_list });
        new_ok_response(req.id, result)
    }

    async fn handle_tools_call(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match req.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(p) => p,
                Err(e) => {
                    return new_error_response(
                        req.id,
                        ERR_CODE_BAD_PARAMS,
                        format!("invalid params: {}", e),
                    )
                }
            },
            None => {
                return new_error_response(req.id, ERR_CODE_BAD_PARAMS, "params required");
            }
        };

        let args = if params.arguments.is_null() {
            json!({})
        } else {
            params.arguments
        };

        // Find tool definition.
        let tool = match self.tools.get(&params.name) {
            Some(t) => t,
            None => {
                tracing::warn!(tool = %params.name, "unknown tool");
                return new_error_response(
                    req.id,
                    ERR_CODE_NO_METHOD,
                    format!("Unknown tool: {}", params.name),
                );
            }
        };

        // Validate arguments.
        if let Err(e) = tool.validate_arguments(&args) {
            tracing::warn!(tool = %params.name, error = %e, "invalid tool arguments");
            return new_error_response(
                req.id,
                ERR_CODE_BAD_PARAMS,
                format!("Invalid arguments: {}", e),
            );
        }

        // Find handler.
        let handler = match self.tool_handlers.get(&params.name) {
            Some(h) => h,
            None => {
                return new_error_response(
                    req.id,
                    ERR_CODE_INTERNAL,
                    format!("no handler for tool: {}", params.name),
                )
            }
        };

        tracing::info!(tool = %params.name, "tools/call");

        // Execute handler.
        let result = match handler.call(args).await {
            Ok(r) => r,
            Err(McpError::Validation(msg)) => {
                return new_error_response(
                    req.id,
                    ERR_CODE_BAD_PARAMS,
                    format!("Invalid arguments: {}", msg),
                )
            }
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "tool handler failed");
                error_result(e.to_string())
            }
        };

        match serde_json::to_value(&result) {
            Ok(value) => new_ok_response(req.id, value),
            Err(e) => new_error_response(
                req.id,
                ERR_CODE_INTERNAL,
                format!("serialize tool result: {}", e),
            ),
        }
    }
}

/// Builder for constructing an MCP Server.
#[derive(Default)]
pub struct ServerBuilder {
    tools: Vec<Tool>,
    server_name: Option<String>,
    server_version: Option<String>,
}

impl ServerBuilder {
    /// Load tool definitions from a JSON file.
    pub fn tools_file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        match loader::load_tools(path) {
            Ok(tools) => self.tools.extend(tools),
            Err(e) => tracing::error!("load tools file: {}", e),
        }
        self
    }

    /// Add tool definitions directly.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Parse tool definitions from raw JSON bytes.
    pub fn tools_json(mut self, data: &[u8]) -> Self {
        match loader::parse_tools(data) {
            Ok(tools) => self.tools.extend(tools),
            Err(e) => tracing::error!("parse tools json: {}", e),
        }
        self
    }

    /// Set server name and version.
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self.server_version = Some(version.into());
        self
    }

    /// Build the server.
    pub fn build(self) -> Server {
        let tool_map: HashMap<String, Tool> =
            self.tools.iter().map(|t| (t.name.clone(), t.clone())).collect();

        Server {
            server_name: self.server_name.unwrap_or_else(|| "mcpserver".into()),
            server_version: self.server_version.unwrap_or_else(|| "1.0.0".into()),
            tools: tool_map,
            tool_list: self.tools,
            tool_handlers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn call(&self, args: Value) -> Result<ToolResult, McpError> {
            let msg = args.get("msg").and_then(|v| v.as_str()).unwrap_or("no msg");
            Ok(text_result(format!("echo: {}", msg)))
        }
    }

    fn test_server() -> Server {
        let tools_json = r#"[
            {"name":"echo","description":"echoes","inputSchema":{"type":"object","properties":{"msg":{"type":"string"}},"required":["msg"]}},
            {"name":"fail","description":"always fails","inputSchema":{"type":"object","properties":{}}}
        ]"#;

        let mut srv = Server::builder()
            .tools_json(tools_json.as_bytes())
            .server_info("test-server", "0.1.0")
            .build();

        srv.handle_tool("echo", Arc::new(EchoHandler));
        srv.handle_tool(
            "fail",
            FnToolHandler::new(|_args: Value| async move {
                Err(McpError::ToolError("nope".into()))
            }),
        );
        srv
    }

    fn make_req(method: &str, id: Option<Value>, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params,
        }
    }

    #[tokio::test]
    async fn test_bad_jsonrpc_version() {
        let srv = test_server();
        let req = JsonRpcRequest {
            jsonrpc: "1.0".into(),
            id: Some(json!(1)),
            method: "ping".into(),
            params: None,
        };
        let resp = srv.handle(req).await;
        assert!(resp.error.is_some());
        assert_eq!(resp.error.unwrap().code, ERR_CODE_INVALID_REQ);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let srv = test_server();
        let resp = srv.handle(make_req("unknown/method", Some(json!(1)), None)).await;
        assert!(resp.error.is_some());
        assert_eq!(resp.error.unwrap().code, ERR_CODE_NO_METHOD);
    }

    #[tokio::test]
    async fn test_initialize() {
        let srv = test_server();
        let params = json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0.1"}
        });
        let resp = srv.handle(make_req("initialize", Some(json!(1)), Some(params))).await;
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_ping() {
        let srv = test_server();
        let resp = srv.handle(make_req("ping", Some(json!(1)), None)).await;
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_notifications_return_sentinel() {
        let srv = test_server();
        for method in ["notifications/initialized", "notifications/cancelled"] {
            let resp = srv.handle(make_req(method, None, None)).await;
            assert!(resp.is_notification());
        }
    }

    #[tokio::test]
    async fn test_tools_list() {
        let srv = test_server();
        let resp = srv.handle(make_req("tools/list", Some(json!(1)), None)).await;
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0].get("schemaMeta").is_none());
        assert_eq!(tools[0]["inputSchema"]["required"][0], "msg");
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let srv = test_server();
        let params = json!({"name": "echo", "arguments": {"msg": "hello"}});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        assert!(resp.error.is_none());
        let result: ToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.first_text(), Some("echo: hello"));
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_tools_call_missing_required() {
        let srv = test_server();
        let params = json!({"name": "echo", "arguments": {}});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ERR_CODE_BAD_PARAMS);
        assert!(err.message.starts_with("Invalid arguments:"));
    }

    #[tokio::test]
    async fn test_tools_call_null_arguments_treated_as_empty() {
        let srv = test_server();
        let params = json!({"name": "echo"});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        assert_eq!(resp.error.unwrap().code, ERR_CODE_BAD_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let srv = test_server();
        let params = json!({"name": "nonexistent", "arguments": {}});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ERR_CODE_NO_METHOD);
        assert_eq!(err.message, "Unknown tool: nonexistent");
    }

    #[tokio::test]
    async fn test_tools_call_no_handler() {
        let srv = Server::builder()
            .tools_json(
                r#"[{"name":"no-handler","description":"test","inputSchema":{"type":"object","properties":{}}}]"#.as_bytes(),
            )
            .build();
        let params = json!({"name": "no-handler", "arguments": {}});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        assert!(resp.error.is_some());
        assert_eq!(resp.error.unwrap().code, ERR_CODE_INTERNAL);
    }

    #[tokio::test]
    async fn test_tools_call_handler_error_becomes_error_result() {
        let srv = test_server();
        let params = json!({"name": "fail", "arguments": {}});
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), Some(params))).await;
        let result: ToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("tool error: nope"));
    }

    #[tokio::test]
    async fn test_tools_call_missing_params() {
        let srv = test_server();
        let resp = srv.handle(make_req("tools/call", Some(json!(1)), None)).await;
        assert_eq!(resp.error.unwrap().code, ERR_CODE_BAD_PARAMS);
    }
}
