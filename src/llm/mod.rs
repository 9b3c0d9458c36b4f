//! LLM integration: chat wire types and the OpenRouter binding.

mod client;
mod types;

pub use client::{LlmClient, LlmError, OpenRouterClient};
pub use types::{
    AssistantMessage, ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall,
    FunctionSchema, Role, ToolCall, ToolSchema, Usage,
};
