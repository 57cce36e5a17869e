use contacts_core::Error;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

/// The `tools/call` result envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn failure(error: &Error) -> Self {
        let mut detail = json!({
            "kind": error.kind(),
            "message": error.to_string()
        });
        if let Error::RemoteApi { status, body } = error {
            detail["status"] = json!(status);
            detail["body"] = body.clone();
        }

        Self {
            content: vec![TextContent::new(error.to_string())],
            structured_content: Some(json!({ "error": detail })),
            is_error: true,
        }
    }
}

/// Wraps a validated output value with a pretty-printed text mirror.
pub fn present(value: Value) -> ToolResult {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    ToolResult {
        content: vec![TextContent::new(text)],
        structured_content: Some(value),
        is_error: false,
    }
}
