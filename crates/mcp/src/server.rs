use contacts_core::Error;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::tools::{ToolRegistry, ToolResult};
use crate::transport::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_NAME: &str = "contacts-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2025-06-18";

pub struct McpServer {
    registry: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handles one line of input. Returns `None` for notifications.
    pub fn handle_request(&mut self, input: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => return encode(&JsonRpcResponse::error(None, PARSE_ERROR, "Parse error")),
        };

        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return encode(&JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        };

        debug!(method = %request.method, "request");
        if request.is_notification() || is_initialized_notice(&request.method) {
            self.handle_notification(&request);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        encode(&response)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        if is_initialized_notice(&request.method) {
            self.initialized = true;
            info!("client initialized");
        } else {
            debug!(method = %request.method, "ignoring notification");
        }
    }

    fn handle_initialize(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.registry.definitions();
        JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params = match &request.params {
            Some(p) => p,
            None => {
                return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing params")
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name,
            None => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    INVALID_PARAMS,
                    "Missing tool name",
                )
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let result = match self.registry.call(name, &arguments) {
            Ok(result) => result,
            Err(e @ Error::UnknownTool(_)) => {
                return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, e.to_string())
            }
            Err(e) => ToolResult::failure(&e),
        };

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(request.id.clone(), INTERNAL_ERROR, e.to_string()),
        }
    }
}

fn is_initialized_notice(method: &str) -> bool {
    matches!(method, "initialized" | "notifications/initialized")
}

fn encode(response: &JsonRpcResponse) -> Option<String> {
    serde_json::to_string(response).ok()
}
