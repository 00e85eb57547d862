//! MCP server
//!
//! Newline-delimited JSON-RPC 2.0 over stdio. The same request handling
//! backs the `POST /mcp` HTTP route.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use super::tools::ToolHandler;
use crate::error::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// MCP server that handles JSON-RPC requests
#[derive(Clone)]
pub struct McpServer {
    tool_handler: ToolHandler,
}

impl McpServer {
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self { tool_handler }
    }

    /// Serve on stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        info!("MCP server started, listening on stdin...");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await?;
        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve one JSON-RPC message per line from `reader`, answering on `writer`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("Received EOF, shutting down");
                    break;
                }
                Ok(_) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }
                    debug!("Received request: {}", message);

                    let Some(response) = self.handle_line(message).await else {
                        continue;
                    };

                    let mut response_json = serde_json::to_string(&response)?;
                    debug!("Sending response: {}", response_json);
                    response_json.push('\n');

                    writer.write_all(response_json.as_bytes()).await?;
                    writer.flush().await?;
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Handle one raw JSON-RPC message; `None` for notifications
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                ));
            }
        };
        self.handle_value(value).await
    }

    /// Handle an already-parsed JSON-RPC message
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned().filter(|id| !id.is_null());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
            )),
        }
    }

    /// Route a request to its handler
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(&request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling initialize");

        JsonRpcResponse::success(
            request.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "scribe",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {}
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id,
            json!({
                "tools": self.tool_handler.list_tools()
            }),
        )
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let Some(params) = request.params.as_object() else {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_params("params must be an object"),
            );
        };

        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_params("missing 'name' field"),
            );
        };

        if !self.tool_handler.has_tool(tool_name) {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", tool_name)),
            );
        }

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        match self.tool_handler.execute(tool_name, arguments).await {
            Ok(result) => JsonRpcResponse::success(
                request.id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": serde_json::to_string_pretty(&result)
                                .unwrap_or_else(|_| result.to_string())
                        }
                    ]
                }),
            ),
            Err(e) => {
                warn!(tool = tool_name, kind = e.kind().as_str(), "Tool failed: {}", e);
                JsonRpcResponse::error(request.id, JsonRpcError::from(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WordPressConfig;
    use crate::operations::Operations;
    use crate::wordpress::WordPressClient;
    use secrecy::SecretString;
    use std::sync::Arc;
    use std::time::Duration;

    /// Server whose WordPress client points at a closed port
    fn offline_server() -> McpServer {
        let wordpress = WordPressClient::new(&WordPressConfig {
            base_url: url::Url::parse("http://127.0.0.1:9").unwrap(),
            username: "editor".to_string(),
            application_password: SecretString::from("secret".to_string()),
            timeout: Duration::from_secs(1),
            media_timeout: Duration::from_secs(1),
        })
        .unwrap();
        let ops = Operations::new(Arc::new(wordpress), None);
        McpServer::new(ToolHandler::new(Arc::new(ops)))
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = offline_server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "scribe");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = offline_server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 15);
        assert!(tools
            .iter()
            .any(|t| t["name"] == "generate_content_from_prompt" && t["inputSchema"]["required"][0] == "prompt"));
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let response = offline_server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_null_id_still_gets_a_response() {
        let response = offline_server()
            .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Some(Value::Null));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_parse_and_method_errors() {
        let server = offline_server();

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
        assert!(response.id.is_none());

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);

        let response = server
            .handle_line(r#"{"jsonrpc":"1.0","id":4,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let response = offline_server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"publish_everything"}}"#,
            )
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("publish_everything"));
    }

    #[tokio::test]
    async fn test_ai_tool_without_generator() {
        let response = offline_server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"generate_post_with_ai","arguments":{"prompt":"coffee"}}}"#,
            )
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32003);
        assert_eq!(error.data.unwrap()["kind"], "RemoteUnavailable");
    }

    #[tokio::test]
    async fn test_serve_answers_requests_in_order() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
            "\n",
        );
        let reader = tokio_test::io::Builder::new().read(input.as_bytes()).build();
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"jsonrpc\":\"2.0\",\"result\":{},\"id\":7}\n")
            .build();

        offline_server()
            .serve(BufReader::new(reader), writer)
            .await
            .unwrap();
    }
}
