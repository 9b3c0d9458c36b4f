//! # Career Advisor
//!
//! An LLM-driven IT career consultant for the Brazilian job market.
//!
//! This library provides:
//! - A tool-calling agent loop that collects live market data
//! - Two data-gathering tools: job-market demand (SerpAPI / Google Jobs)
//!   and trending cloud certifications (official provider pages)
//! - Integration with OpenRouter for LLM access
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive the user's role and technology focus
//! 2. Build context with system prompt and the two available tools
//! 3. Call LLM, parse response, dispatch any tool calls
//! 4. Feed results back to LLM; once both tools have been called, stop
//!    soliciting tools and take the next response as the final plan
//! 5. Validate the answer shape (5 bullets) with at most one reformat round
//!
//! ## Example
//!
//! ```rust,ignore
//! use career_advisor::{agent::Agent, config::Config, tools};
//!
//! let config = Config::from_env()?;
//! let registry = tools::default_registry(&config)?;
//! let agent = Agent::new(config, registry);
//! let plan = agent.advise("Engenheiro de DevOps", "Nuvem").await?;
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
