//! Tool registration, argument validation, and invocation.

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

/// Handler-level failure. Reported to the client as an `isError` tool
/// result, never as a protocol error.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ToolHandler =
    Box<dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<ToolCallResult, ToolError>> + Send + Sync>;

/// Declared JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    fn schema_name(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
        }
    }
}

/// One declared parameter: type, optionality, default.
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

/// A registered tool: descriptor plus async handler.
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub handler: ToolHandler,
}

impl ToolSpec {
    fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(p.kind.schema_name()));
            prop.insert("description".into(), json!(p.description));
            if let Some(default) = &p.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(p.name.to_string(), Value::Object(prop));
            if p.required {
                required.push(p.name);
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        Value::Object(schema)
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            input_schema: self.input_schema(),
        }
    }
}

/// Named callable tools. Built once at startup, immutable afterwards.
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolSpec>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Duplicate names are a startup error.
    pub fn register(&mut self, spec: ToolSpec) -> McpResult<()> {
        if self.tools.contains_key(spec.name) {
            return Err(McpError::DuplicateTool(spec.name.to_string()));
        }
        self.order.push(spec.name);
        self.tools.insert(spec.name, spec);
        Ok(())
    }

    /// Tool descriptors in registration order, for `tools/list`.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(ToolSpec::definition)
            .collect()
    }

    /// Validate arguments against the tool's schema and invoke its
    /// handler. Handler failures come back as an `isError` result; only
    /// lookup and validation failures are protocol-level errors.
    pub async fn invoke(&self, name: &str, arguments: Option<Value>) -> McpResult<ToolCallResult> {
        let spec = self
            .tools
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let args = validate_arguments(&spec.params, arguments)?;

        tracing::info!(tool = name, "invoking tool");
        match (spec.handler)(args).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool handler failed");
                Ok(ToolCallResult::error(format!("{name} failed: {e}")))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check declared parameters and apply defaults.
///
/// Unrecognized parameters are dropped rather than rejected, so newer
/// clients can send fields this server does not know about yet.
fn validate_arguments(
    params: &[ParamSpec],
    arguments: Option<Value>,
) -> McpResult<Map<String, Value>> {
    let raw = match arguments {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(McpError::InvalidParams(format!(
                "arguments must be an object, got {other}"
            )));
        }
    };

    let mut validated = Map::new();
    for spec in params {
        match raw.get(spec.name) {
            Some(Value::Null) | None => {
                if let Some(default) = &spec.default {
                    validated.insert(spec.name.to_string(), default.clone());
                } else if spec.required {
                    return Err(McpError::InvalidParams(format!(
                        "missing required parameter '{}'",
                        spec.name
                    )));
                }
            }
            Some(value) => {
                if !spec.kind.matches(value) {
                    return Err(McpError::InvalidParams(format!(
                        "parameter '{}' must be a {}",
                        spec.name,
                        spec.kind.schema_name()
                    )));
                }
                validated.insert(spec.name.to_string(), value.clone());
            }
        }
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_tool() -> ToolSpec {
        ToolSpec {
            name: "echo",
            description: "Echo back the message",
            params: vec![
                ParamSpec {
                    name: "message",
                    kind: ParamKind::String,
                    required: true,
                    default: None,
                    description: "Text to echo",
                },
                ParamSpec {
                    name: "prefix",
                    kind: ParamKind::String,
                    required: false,
                    default: Some(json!(">")),
                    description: "Line prefix",
                },
            ],
            handler: Box::new(|args| {
                Box::pin(async move {
                    let message = args["message"].as_str().unwrap_or_default().to_string();
                    let prefix = args["prefix"].as_str().unwrap_or_default().to_string();
                    Ok(ToolCallResult::text(format!("{prefix} {message}")))
                })
            }),
        }
    }

    fn failing_tool() -> ToolSpec {
        ToolSpec {
            name: "alwaysFails",
            description: "Fails on every call",
            params: vec![],
            handler: Box::new(|_| Box::pin(async { Err(ToolError::new("boom")) })),
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();
        let err = registry.register(echo_tool()).unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(name) if name == "echo"));
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("doesNotExist", None).await.unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn missing_required_parameter_names_the_field() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();

        let err = registry.invoke("echo", Some(json!({}))).await.unwrap_err();
        match err {
            McpError::InvalidParams(msg) => assert!(msg.contains("message"), "{msg}"),
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn type_mismatch_is_a_validation_error() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();

        let err = registry
            .invoke("echo", Some(json!({ "message": 42 })))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn defaults_and_unknown_parameters() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();

        let result = registry
            .invoke(
                "echo",
                Some(json!({ "message": "hi", "futureField": true })),
            )
            .await
            .unwrap();
        assert!(result.is_error.is_none());
        match &result.content[0] {
            crate::types::ToolContent::Text { text } => assert_eq!(text, "> hi"),
        }
    }

    #[tokio::test]
    async fn handler_failure_becomes_error_result() {
        let mut registry = ToolRegistry::new();
        registry.register(failing_tool()).unwrap();

        let result = registry.invoke("alwaysFails", None).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        match &result.content[0] {
            crate::types::ToolContent::Text { text } => {
                assert!(text.contains("boom"), "{text}")
            }
        }
    }

    #[test]
    fn schema_lists_required_fields() {
        let schema = echo_tool().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["message"]["type"], "string");
        assert_eq!(schema["required"], json!(["message"]));
        assert_eq!(schema["properties"]["prefix"]["default"], ">");
    }
}
