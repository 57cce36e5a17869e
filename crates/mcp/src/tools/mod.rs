mod directory;
mod read;
mod result;
mod write;

use contacts_core::{ApiRequest, Credential, Error, InputSchema, Result, Transport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use result::{present, TextContent, ToolResult};

/// Advertised shape of a tool in `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "outputSchema")]
    pub output_schema: Value,
    #[serde(skip_serializing_if = "ToolAnnotations::is_empty", default)]
    pub annotations: ToolAnnotations,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
}

impl ToolAnnotations {
    pub fn read_only() -> Self {
        Self {
            read_only_hint: Some(true),
            destructive_hint: None,
        }
    }

    pub fn destructive() -> Self {
        Self {
            read_only_hint: None,
            destructive_hint: Some(true),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read_only_hint.is_none() && self.destructive_hint.is_none()
    }
}

/// Everything a handler needs to reach the People API.
#[derive(Clone)]
pub struct ToolContext {
    credential: Credential,
    transport: Arc<dyn Transport>,
}

impl ToolContext {
    pub fn new(credential: Credential, transport: Arc<dyn Transport>) -> Self {
        Self {
            credential,
            transport,
        }
    }

    pub fn call(&self, request: &ApiRequest) -> Result<Value> {
        debug!(method = %request.method, path = %request.path, "calling people api");
        self.transport.call(request, &self.credential)
    }
}

type Handler = Box<dyn Fn(&ToolContext, &InputSchema, &Value) -> Result<ToolResult> + Send + Sync>;

pub struct Tool {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input: InputSchema,
    pub output_schema: Value,
    pub annotations: ToolAnnotations,
    handler: Handler,
}

impl Tool {
    /// Builds a tool whose handler receives arguments already normalized by
    /// `input` and deserialized into `A`.
    pub fn new<A, F>(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        input: InputSchema,
        output_schema: Value,
        annotations: ToolAnnotations,
        handler: F,
    ) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&ToolContext, A) -> Result<ToolResult> + Send + Sync + 'static,
    {
        Self {
            name,
            title,
            description,
            input,
            output_schema,
            annotations,
            handler: Box::new(move |ctx: &ToolContext, input: &InputSchema, arguments: &Value| {
                let args: A = input.parse(arguments)?;
                handler(ctx, args)
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            input_schema: self.input.json_schema().clone(),
            output_schema: self.output_schema.clone(),
            annotations: self.annotations,
        }
    }

    pub fn invoke(&self, ctx: &ToolContext, arguments: &Value) -> Result<ToolResult> {
        (self.handler)(ctx, &self.input, arguments)
    }
}

pub struct ToolRegistry {
    context: ToolContext,
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new(context: ToolContext) -> Result<Self> {
        let mut tools = Vec::new();
        tools.extend(read::definitions()?);
        tools.extend(write::definitions()?);
        tools.extend(directory::definitions()?);
        Ok(Self { context, tools })
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn call(&self, name: &str, arguments: &Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        info!(tool = name, "tool call");
        let result = tool.invoke(&self.context, arguments);
        if let Err(e) = &result {
            warn!(tool = name, kind = e.kind(), error = %e, "tool call failed");
        }
        result
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `/people/c123` for a caller-supplied resource name.
fn resource_path(resource_name: &str) -> String {
    format!("/{}", resource_name.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_core::testing::MockTransport;
    use serde_json::json;

    fn registry(transport: Arc<MockTransport>) -> ToolRegistry {
        ToolRegistry::new(ToolContext::new(Credential::new("t"), transport)).unwrap()
    }

    #[test]
    fn registers_all_seven_tools() {
        let registry = registry(Arc::new(MockTransport::replying(json!({}))));
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "contacts_list",
                "contact_get",
                "contact_search",
                "contact_create",
                "contact_update",
                "contact_delete",
                "directory_search"
            ]
        );
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let registry = registry(Arc::new(MockTransport::replying(json!({}))));
        let err = registry.call("contacts_nuke", &json!({})).unwrap_err();
        assert!(matches!(err, Error::UnknownTool(_)));
    }

    #[test]
    fn unknown_field_fails_every_tool_without_calling_remote() {
        let transport = Arc::new(MockTransport::replying(json!({})));
        let registry = registry(transport.clone());

        for def in registry.definitions() {
            let err = registry
                .call(&def.name, &json!({"bogusField": 1}))
                .unwrap_err();
            assert!(
                matches!(err, Error::InvalidInput(_)),
                "{} accepted an unknown field",
                def.name
            );
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn annotations_mark_read_only_and_destructive_tools() {
        let registry = registry(Arc::new(MockTransport::replying(json!({}))));
        let def = |name: &str| {
            registry
                .definitions()
                .into_iter()
                .find(|d| d.name == name)
                .unwrap()
        };
        assert_eq!(def("contacts_list").annotations.read_only_hint, Some(true));
        assert_eq!(def("directory_search").annotations.read_only_hint, Some(true));
        assert_eq!(def("contact_delete").annotations.destructive_hint, Some(true));
        assert!(def("contact_create").annotations.is_empty());
    }

    #[test]
    fn resource_path_tolerates_leading_slash() {
        assert_eq!(resource_path("people/c1"), "/people/c1");
        assert_eq!(resource_path("/people/c1"), "/people/c1");
    }
}
