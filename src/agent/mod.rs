//! Agent module - the core orchestration logic.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt and the user's request
//! 2. Call LLM with the two available tools
//! 3. If LLM requests tool calls, dispatch them and feed results back
//! 4. Once both tools have been called (or the iteration bound fires),
//!    stop soliciting tools and take the model's text as the final answer
//! 5. Check the answer shape; allow exactly one reformatting round

mod agent_loop;
mod prompt;
pub mod trace;
pub mod validator;

pub use agent_loop::{Agent, AgentError};
pub use prompt::build_system_prompt;
