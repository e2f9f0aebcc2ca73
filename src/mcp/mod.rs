//! Stdio MCP bridge
//!
//! Speaks newline-delimited JSON-RPC 2.0 and exposes a single `ask_gemini`
//! tool whose calls are forwarded to the relay's HTTP endpoint.

pub mod forwarder;
pub mod types;

pub use forwarder::{HttpForwarder, QueryForwarder};
pub use types::{JsonRpcRequest, JsonRpcResponse, Tool};

use crate::adapter::coerce_text;
use serde_json::{json, Value};
use types::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, PARSE_ERROR};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const ASK_TOOL: &str = "ask_gemini";

pub struct McpBridge {
    forwarder: Box<dyn QueryForwarder>,
    tools: Vec<Tool>,
}

impl McpBridge {
    pub fn new(forwarder: Box<dyn QueryForwarder>) -> Self {
        Self {
            forwarder,
            tools: vec![Tool {
                name: ASK_TOOL.to_string(),
                description: "Ask Gemini AI a question".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The question to ask Gemini"
                        }
                    },
                    "required": ["query"]
                }),
            }],
        }
    }

    /// Handle one input line. Returns the serialized reply, or `None` for
    /// notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => {
                tracing::warn!("Unparseable JSON-RPC line: {}", e);
                Some(JsonRpcResponse::failure(None, PARSE_ERROR, "Parse error"))
            }
            Ok(value) => {
                let id = value.get("id").cloned();
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Ok(request) if request.has_supported_version() => {
                        self.handle_request(request).await
                    }
                    Ok(request) => Some(JsonRpcResponse::failure(
                        id,
                        INVALID_REQUEST,
                        format!(
                            "Unsupported jsonrpc version: {}",
                            request.jsonrpc.as_deref().unwrap_or_default()
                        ),
                    )),
                    Err(e) => Some(JsonRpcResponse::failure(
                        id,
                        INVALID_REQUEST,
                        format!("Invalid request: {}", e),
                    )),
                }
            }
        };

        response.map(|r| {
            serde_json::to_string(&r).unwrap_or_else(|e| {
                tracing::error!("Failed to serialize JSON-RPC response: {}", e);
                format!(
                    r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"Internal error"}}}}"#,
                    INTERNAL_ERROR
                )
            })
        })
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        tracing::debug!("JSON-RPC method: {}", request.method);

        let result = match request.method.as_str() {
            "notifications/initialized" => return None,
            "initialize" => json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
            "tools/list" => json!({ "tools": self.tools }),
            "resources/list" => json!({ "resources": [] }),
            "prompts/list" => json!({ "prompts": [] }),
            "tools/call" => return Some(self.call_tool(id, &request.params).await),
            other => {
                return Some(JsonRpcResponse::failure(
                    id,
                    INTERNAL_ERROR,
                    format!("Unknown method: {}", other),
                ))
            }
        };

        Some(JsonRpcResponse::success(id, result))
    }

    async fn call_tool(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        if name != ASK_TOOL {
            return JsonRpcResponse::failure(id, INTERNAL_ERROR, format!("Unknown tool: {}", name));
        }

        // Scalars are forwarded as text; null, arrays and objects are rejected.
        let Some(query) = params
            .get("arguments")
            .and_then(|args| args.get("query"))
            .filter(|q| q.is_string() || q.is_number() || q.is_boolean())
            .map(coerce_text)
        else {
            return JsonRpcResponse::failure(
                id,
                INVALID_PARAMS,
                "Missing required argument: query",
            );
        };

        match self.forwarder.forward(&query).await {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({ "content": [{ "type": "text", "text": text }] }),
            ),
            Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
        }
    }
}
