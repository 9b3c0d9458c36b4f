//! Configuration management for the career advisor.
//!
//! Configuration can be set via environment variables (a `.env` file is
//! loaded by the CLI before this runs):
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `SERPAPI_API_KEY` - Optional. SerpAPI key for the job-market tool.
//!   When absent the tool reports its own error result instead of data.
//! - `DEFAULT_MODEL` - Optional. The LLM model to use. Defaults to
//!   `google/gemini-flash-1.5`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `5`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// SerpAPI key for the job-market demand tool
    pub serpapi_key: Option<String>,

    /// LLM model identifier (OpenRouter format)
    pub default_model: String,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let serpapi_key = std::env::var("SERPAPI_API_KEY").ok();

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "google/gemini-flash-1.5".to_string());

        let max_iterations = std::env::var("MAX_ITERATIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            serpapi_key,
            default_model,
            max_iterations,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            serpapi_key: None,
            default_model: "google/gemini-flash-1.5".to_string(),
            max_iterations: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = Config::new("test-key".to_string());
        assert_eq!(config.api_key, "test-key");
        assert!(config.serpapi_key.is_none());
        assert_eq!(config.max_iterations, 5);
    }
}
