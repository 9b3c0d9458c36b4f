//! Wire types for the OpenAI-style chat completions API.
//!
//! Serde-serializable to JSON for HTTP calls. The agent loop builds the
//! transcript out of these; the transcript is append-only and loop-local.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Carries a tool result back to the model, correlated by `tool_call_id`.
    Tool,
}

/// A single message in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,

    /// Textual content. `None` for assistant turns that only carry tool calls.
    pub content: Option<String>,

    /// Tool calls issued by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// For tool messages: the id of the call this result answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A model-issued request to invoke a named tool. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,

    #[serde(rename = "type", default = "function_call_type")]
    pub call_type: String,

    pub function: FunctionCall,
}

/// The function half of a tool call: name plus JSON-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

fn function_call_type() -> String {
    "function".to_string()
}

/// A tool declaration advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

/// Declared function: name, description, and JSON-schema parameters.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSchema {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSchema>>,
}

/// Response from the chat completions endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant's turn: optional content text and zero-or-more tool calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Token usage reported by the API.
#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_without_tools() {
        let req = ChatRequest {
            model: "google/gemini-flash-1.5".into(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: Some("Hello".into()),
                tool_calls: None,
                tool_call_id: None,
            }],
            tools: None,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "google/gemini-flash-1.5");
        assert_eq!(json["messages"][0]["role"], "user");
        // tools is None -> should be skipped
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn request_serializes_tool_schema() {
        let schema = ToolSchema::function(
            "lookup",
            "Look something up",
            json!({"type": "object", "properties": {}}),
        );
        let req = ChatRequest {
            model: "m".into(),
            messages: vec![],
            tools: Some(vec![schema]),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "lookup");
    }

    #[test]
    fn tool_message_carries_call_id() {
        let msg = ChatMessage {
            role: Role::Tool,
            content: Some(r#"{"data":{}}"#.into()),
            tool_calls: None,
            tool_call_id: Some("call_1".into()),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn response_deserializes_tool_calls() {
        let json = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "analyze_market_demand", "arguments": "{\"area\":\"DevOps\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18}
        }"#;

        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let message = &resp.choices[0].message;
        assert!(message.content.is_none());
        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].function.name, "analyze_market_demand");
        assert_eq!(resp.usage.unwrap().prompt_tokens, 120);
    }

    #[test]
    fn response_deserializes_plain_text() {
        let json = r#"{
            "choices": [{
                "message": {"content": "All done."},
                "finish_reason": "stop"
            }]
        }"#;

        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("All done."));
        assert!(resp.choices[0].message.tool_calls.is_none());
        assert_eq!(resp.choices[0].finish_reason.as_deref(), Some("stop"));
    }
}
