//! Tool contract and registry.
//!
//! Tools are exposed to the agent loop uniformly: a name, a description, a
//! declared parameter schema, and an async handler. Dispatch never raises —
//! every failure (unknown tool, bad arguments, handler error) becomes a
//! [`ToolResult::Error`] that the loop feeds back to the model as an
//! observation.

pub mod certifications;
pub mod market;

pub use certifications::TrendingCertifications;
pub use market::MarketDemand;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Config;
use crate::llm::ToolSchema;

/// An external data-gathering function exposed to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in routing and in the schema sent to the model).
    fn name(&self) -> &str;

    /// Human-readable description, included in the system prompt and schema.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters. Optional parameters declare
    /// their `default` here; the registry fills them in before dispatch.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with bound arguments. Errors returned here are
    /// absorbed by the registry, never propagated to the loop.
    async fn execute(&self, args: Value) -> anyhow::Result<Value>;
}

/// Structured outcome of a tool dispatch. Serializes externally tagged:
/// `{"data": ...}` on success, `{"error": {...}}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolResult {
    #[serde(rename = "data")]
    Data(Value),
    #[serde(rename = "error")]
    Error(ToolFailure),
}

/// Error payload of a failed dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ToolFailure {
            message: message.into(),
            details: None,
        })
    }

    pub fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Error(ToolFailure {
            message: message.into(),
            details: Some(details.into()),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Closed mapping from tool name to handler plus declared schema.
/// Registration order is preserved so prompts and schemas are stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Registered tools, in registration order.
    pub fn list_tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Names of all registered tools.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Tool declarations in the shape the model API expects.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema::function(t.name(), t.description(), t.parameters_schema()))
            .collect()
    }

    /// Route a call to its handler. Dispatch failure is data, not an
    /// exception: unknown names, unknown arguments, and handler errors all
    /// come back as [`ToolResult::Error`] so the loop can keep going.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolResult {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            return ToolResult::error(format!("tool '{}' is not implemented", name));
        };

        let bound = match bind_arguments(&tool.parameters_schema(), args) {
            Ok(bound) => bound,
            Err(message) => return ToolResult::error(message),
        };

        match tool.execute(bound).await {
            Ok(value) => ToolResult::Data(value),
            Err(e) => ToolResult::error_with_details(
                format!("failed to execute '{}'", name),
                format!("{e:#}"),
            ),
        }
    }
}

/// Map call arguments onto the declared schema: reject unknown argument
/// names, fill declared defaults for omitted optionals.
fn bind_arguments(schema: &Value, args: Value) -> Result<Value, String> {
    let mut bound = match args {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return Err(format!("expected an object of arguments, got: {other}")),
    };

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for key in bound.keys() {
            if !properties.contains_key(key) {
                return Err(format!("unknown argument '{}'", key));
            }
        }
        for (key, declaration) in properties {
            if !bound.contains_key(key) {
                if let Some(default) = declaration.get("default") {
                    bound.insert(key.clone(), default.clone());
                }
            }
        }
    }

    Ok(Value::Object(bound))
}

/// Build the registry with the two production tools.
pub fn default_registry(config: &Config) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(MarketDemand::new(config.serpapi_key.clone())))?;
    registry.register(Arc::new(TrendingCertifications::new()))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its arguments back as data."
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "suffix": { "type": "string", "default": "!" }
                },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<Value> {
            Ok(args)
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: Value) -> anyhow::Result<Value> {
            anyhow::bail!("upstream unavailable")
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        registry.register(Arc::new(FailingTool)).unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = registry();
        let err = registry.register(Arc::new(EchoTool)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "echo"));
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_is_an_error_result() {
        let result = registry().dispatch("missing_tool", json!({})).await;
        match result {
            ToolResult::Error(failure) => {
                assert!(failure.message.contains("missing_tool"));
                assert!(failure.message.contains("not implemented"));
            }
            ToolResult::Data(_) => panic!("expected an error result"),
        }
    }

    #[tokio::test]
    async fn dispatch_fills_declared_defaults() {
        let result = registry().dispatch("echo", json!({"text": "hi"})).await;
        match result {
            ToolResult::Data(value) => {
                assert_eq!(value["text"], "hi");
                assert_eq!(value["suffix"], "!");
            }
            ToolResult::Error(failure) => panic!("unexpected error: {}", failure.message),
        }
    }

    #[tokio::test]
    async fn dispatch_keeps_explicit_arguments() {
        let result = registry()
            .dispatch("echo", json!({"text": "hi", "suffix": "?"}))
            .await;
        match result {
            ToolResult::Data(value) => assert_eq!(value["suffix"], "?"),
            ToolResult::Error(failure) => panic!("unexpected error: {}", failure.message),
        }
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_arguments() {
        let result = registry()
            .dispatch("echo", json!({"text": "hi", "volume": 11}))
            .await;
        match result {
            ToolResult::Error(failure) => assert!(failure.message.contains("volume")),
            ToolResult::Data(_) => panic!("expected an error result"),
        }
    }

    #[tokio::test]
    async fn handler_errors_become_error_results() {
        let result = registry().dispatch("flaky", json!({})).await;
        match result {
            ToolResult::Error(failure) => {
                assert!(failure.message.contains("flaky"));
                assert!(failure.details.unwrap().contains("upstream unavailable"));
            }
            ToolResult::Data(_) => panic!("expected an error result"),
        }
    }

    #[test]
    fn result_serialization_shape() {
        let ok = ToolResult::Data(json!({"n": 1}));
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"data":{"n":1}}"#);

        let err = ToolResult::error("boom");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":{"message":"boom"}}"#
        );

        let err = ToolResult::error_with_details("boom", "wire cut");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":{"message":"boom","details":"wire cut"}}"#
        );
    }

    #[test]
    fn schemas_follow_registration_order() {
        let schemas = registry().tool_schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].function.name, "echo");
        assert_eq!(schemas[1].function.name, "flaky");
    }
}
