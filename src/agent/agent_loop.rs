//! Core agent loop implementation.
//!
//! Drives the Thought -> Action -> Observation cycle: call the model,
//! dispatch any tool calls through the registry, feed the results back, and
//! stop once the termination policy fires. Tool failures become
//! observations; only model failures abort the invocation.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::llm::{ChatMessage, LlmClient, LlmError, OpenRouterClient, Role, ToolCall};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;
use super::trace::{LogSink, TraceEvent, TraceSink};
use super::validator::validate;

/// Synthesized follow-up used when the loop ends without assistant text.
const FINALIZE_PROMPT: &str =
    "Produce your final answer now, using the data already collected. Do not request any more tools.";

/// Last-resort answer when even the forced closing call yields nothing.
const FALLBACK_ANSWER: &str = "Sorry, I could not produce an adequate answer.";

#[derive(Debug, Error)]
pub enum AgentError {
    /// Failure calling the model itself. Never retried by the loop.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] LlmError),
}

/// Which tools have been dispatched so far, plus the model-round counter.
/// The called-set only grows; the counter is bounded by configuration.
#[derive(Debug, Default)]
pub struct TerminationState {
    called: HashSet<String>,
    iterations: usize,
}

impl TerminationState {
    fn record_called(&mut self, name: &str) {
        self.called.insert(name.to_string());
    }

    fn all_called(&self, expected: &HashSet<String>) -> bool {
        !expected.is_empty() && expected.is_subset(&self.called)
    }

    fn none_called(&self) -> bool {
        self.called.is_empty()
    }
}

/// The career consultant agent.
pub struct Agent {
    config: Config,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    trace: Arc<dyn TraceSink>,
}

impl Agent {
    /// Create a new agent with the given configuration and tools.
    pub fn new(config: Config, tools: ToolRegistry) -> Self {
        let llm = Arc::new(OpenRouterClient::new(config.api_key.clone()));
        Self {
            config,
            llm,
            tools,
            trace: Arc::new(LogSink),
        }
    }

    /// Create an agent from explicit parts (custom model binding or trace
    /// sink; used by tests to script the model).
    pub fn with_parts(
        config: Config,
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            config,
            llm,
            tools,
            trace,
        }
    }

    /// Produce a career plan for a role and technology focus.
    ///
    /// Runs one full loop, checks the answer shape, and allows exactly one
    /// reformatting round; the second result is returned unconditionally.
    pub async fn advise(&self, area: &str, technology: &str) -> Result<String, AgentError> {
        let request = format!(
            "I want a career plan for the role: {}, focused on: {}.",
            area, technology
        );

        let answer = self.run_turn(&request).await?;
        if validate(&answer) {
            return Ok(answer);
        }

        tracing::warn!("answer failed the bullet format check, requesting one reformat");
        let reformat = format!(
            "Rewrite the final answer as exactly 5 objective items, each explicitly citing \
             'source: ...'. Use the data from the tools already called for the role {} and \
             technology {}.",
            area, technology
        );
        self.run_turn(&reformat).await
    }

    /// Run one full tool-calling turn and return the final answer text.
    pub async fn run_turn(&self, user_message: &str) -> Result<String, AgentError> {
        // Seed the transcript
        let system_prompt = build_system_prompt(&self.tools);
        let mut transcript = vec![
            ChatMessage {
                role: Role::System,
                content: Some(system_prompt),
                tool_calls: None,
                tool_call_id: None,
            },
            ChatMessage {
                role: Role::User,
                content: Some(user_message.to_string()),
                tool_calls: None,
                tool_call_id: None,
            },
        ];

        let tool_schemas = self.tools.tool_schemas();
        let expected: HashSet<String> = self.tools.names().into_iter().collect();
        let mut state = TerminationState::default();
        let mut answer: Option<String> = None;

        // Agent loop
        while state.iterations < self.config.max_iterations {
            state.iterations += 1;

            // Stop soliciting tool calls once every expected tool has been
            // dispatched; the next response is treated as final.
            let soliciting = !tool_schemas.is_empty() && !state.all_called(&expected);

            self.trace.record(TraceEvent::ModelCall {
                iteration: state.iterations,
                tools_enabled: soliciting,
            });
            tracing::debug!(iteration = state.iterations, soliciting, "agent iteration");

            let response = self
                .llm
                .chat_completion(
                    &self.config.default_model,
                    &transcript,
                    soliciting.then_some(tool_schemas.as_slice()),
                )
                .await?;

            let tool_calls = response.tool_calls.clone().unwrap_or_default();

            if tool_calls.is_empty() {
                // No tool calls - this is the final response (or an empty
                // turn, handled by the forced finalization below).
                if let Some(content) = response.content.filter(|c| !c.trim().is_empty()) {
                    answer = Some(content);
                }
                break;
            }

            // Add assistant message with tool calls
            transcript.push(ChatMessage {
                role: Role::Assistant,
                content: response.content.clone(),
                tool_calls: Some(tool_calls.clone()),
                tool_call_id: None,
            });

            // Dispatch each tool call, in the order received
            for tool_call in &tool_calls {
                self.trace.record(TraceEvent::ToolCall {
                    id: tool_call.id.clone(),
                    name: tool_call.function.name.clone(),
                    arguments: tool_call.function.arguments.clone(),
                });

                let result = self.dispatch_tool_call(tool_call).await;

                if expected.contains(&tool_call.function.name) {
                    state.record_called(&tool_call.function.name);
                }

                self.trace.record(TraceEvent::ToolResult {
                    id: tool_call.id.clone(),
                    name: tool_call.function.name.clone(),
                    ok: !result.is_error(),
                });

                let payload = serde_json::to_string(&result).unwrap_or_else(|_| {
                    r#"{"error":{"message":"unserializable tool result"}}"#.to_string()
                });

                // Add tool result message, correlated by call id
                transcript.push(ChatMessage {
                    role: Role::Tool,
                    content: Some(payload),
                    tool_calls: None,
                    tool_call_id: Some(tool_call.id.clone()),
                });
            }

            if state.all_called(&expected) {
                tracing::debug!("both tools dispatched, requesting the final answer");
            }
        }

        let degraded = state.none_called();

        let answer = match answer {
            Some(text) => text,
            None => {
                // Terminal fallback, attempted at most once: force textual
                // output from the data already in the transcript.
                tracing::debug!("no final text yet, forcing a closing model call");
                transcript.push(ChatMessage {
                    role: Role::User,
                    content: Some(FINALIZE_PROMPT.to_string()),
                    tool_calls: None,
                    tool_call_id: None,
                });

                let response = self
                    .llm
                    .chat_completion(&self.config.default_model, &transcript, None)
                    .await?;

                response
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
            }
        };

        if degraded {
            tracing::warn!("final answer produced without any tool data");
        }
        self.trace.record(TraceEvent::FinalAnswer {
            text: answer.clone(),
            degraded,
        });

        Ok(answer)
    }

    /// Execute a single tool call through the registry.
    async fn dispatch_tool_call(&self, tool_call: &ToolCall) -> crate::tools::ToolResult {
        let args: Value =
            serde_json::from_str(&tool_call.function.arguments).unwrap_or(Value::Null);

        self.tools.dispatch(&tool_call.function.name, args).await
    }
}
