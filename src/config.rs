//! Configuration management for bitext-agent
//!
//! This module loads agent settings from environment variables with sensible
//! defaults: which LLM provider answers questions, how the agent loop behaves,
//! where the dataset lives, and how record embeddings are computed.
//!
//! # Environment Variables
//!
//! ## Agent Configuration
//! - `BITEXT_AGENT_PROVIDER`: Chat provider (ollama|openai|anthropic|gemini|xai|groq) - default: "openai"
//! - `BITEXT_AGENT_MODEL`: Chat model name - default: "gpt-4o-mini"
//! - `BITEXT_AGENT_MODE`: Loop strategy (reactive|plan) - default: "reactive"
//! - `BITEXT_AGENT_TIMEOUT_SECS`: Chat request timeout in seconds - default: "120"
//! - `BITEXT_AGENT_MAX_ITERATIONS`: Cap on reactive think/act rounds - default: "10"
//! - `BITEXT_AGENT_DATASET`: Path to the dataset JSON file - default: "data/bitext.json"
//! - `BITEXT_AGENT_EMBEDDINGS_URL`: OpenAI-compatible embeddings endpoint - default: "https://api.openai.com/v1"
//! - `BITEXT_AGENT_EMBEDDINGS_MODEL`: Embeddings model name - default: "text-embedding-3-small"
//! - `BITEXT_AGENT_EMBEDDINGS_DIMENSIONS`: Embedding vector width - default: "1536"
//! - `BITEXT_AGENT_CACHE_ENABLED`: Cache tool results within a session (true|false) - default: "true"
//!
//! ## Provider Configuration
//! These environment variables are read directly by the genai library and the
//! embeddings client:
//! - **Ollama**: `OLLAMA_HOST` (default: http://localhost:11434)
//! - **OpenAI**: `OPENAI_API_KEY` (required), also used for the embeddings endpoint
//! - **Anthropic**: `ANTHROPIC_API_KEY` (required)
//! - **Gemini**: `GOOGLE_API_KEY` (required)
//! - **xAI**: `XAI_API_KEY` (required)
//! - **Groq**: `GROQ_API_KEY` (required)
//! - `BITEXT_AGENT_API_BASE_URL`: custom chat endpoint override (optional)
//!
//! # Example
//!
//! ```no_run
//! use bitext_agent::config::AgentConfig;
//! use std::env;
//!
//! env::set_var("BITEXT_AGENT_PROVIDER", "ollama");
//! env::set_var("BITEXT_AGENT_MODEL", "qwen2.5:7b");
//!
//! let config = AgentConfig::from_env();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::agent::AgentMode;
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_ITERATIONS: usize = 10;
const DEFAULT_DATASET_PATH: &str = "data/bitext.json";
const DEFAULT_EMBEDDINGS_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDINGS_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDINGS_DIMENSIONS: usize = 1536;
const DEFAULT_CACHE_ENABLED: bool = true;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for bitext-agent
///
/// Construct with [`AgentConfig::from_env`], which reads `BITEXT_AGENT_*`
/// environment variables and falls back to defaults for anything unset.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Chat LLM provider (from genai)
    pub provider: AdapterKind,

    /// Chat model name (provider-specific)
    pub model: String,

    /// Agent loop strategy
    pub mode: AgentMode,

    /// Chat request timeout in seconds
    pub request_timeout_secs: u64,

    /// Cap on reactive think/act rounds
    pub max_iterations: usize,

    /// Path to the dataset JSON file
    pub dataset_path: PathBuf,

    /// Base URL of the OpenAI-compatible embeddings endpoint
    pub embeddings_url: String,

    /// Embeddings model name
    pub embeddings_model: String,

    /// Embedding vector width requested from the endpoint
    pub embeddings_dimensions: usize,

    /// Cache tool results within a session
    pub cache_enabled: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AgentConfig {
    /// Loads configuration from environment variables with defaults
    ///
    /// Unparseable values fall back to their defaults rather than failing;
    /// `validate()` catches values that are parseable but out of range.
    pub fn from_env() -> Self {
        let provider = env::var("BITEXT_AGENT_PROVIDER")
            .ok()
            .and_then(|s| AdapterKind::from_lower_str(&s.to_lowercase()))
            .unwrap_or(AdapterKind::OpenAI);

        let model =
            env::var("BITEXT_AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let mode = env::var("BITEXT_AGENT_MODE")
            .ok()
            .and_then(|s| s.parse::<AgentMode>().ok())
            .unwrap_or(AgentMode::Reactive);

        let request_timeout_secs = env::var("BITEXT_AGENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_iterations = env::var("BITEXT_AGENT_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        let dataset_path = env::var("BITEXT_AGENT_DATASET")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATASET_PATH));

        let embeddings_url = env::var("BITEXT_AGENT_EMBEDDINGS_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDINGS_URL.to_string());

        let embeddings_model = env::var("BITEXT_AGENT_EMBEDDINGS_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDINGS_MODEL.to_string());

        let embeddings_dimensions = env::var("BITEXT_AGENT_EMBEDDINGS_DIMENSIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_EMBEDDINGS_DIMENSIONS);

        let cache_enabled = env::var("BITEXT_AGENT_CACHE_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_CACHE_ENABLED);

        Self {
            provider,
            model,
            mode,
            request_timeout_secs,
            max_iterations,
            dataset_path,
            embeddings_url,
            embeddings_model,
            embeddings_dimensions,
            cache_enabled,
        }
    }

    /// Validates the configuration
    ///
    /// Checks that numeric values are in sensible ranges and that the model
    /// and dataset path are non-empty. Provider credentials are validated by
    /// genai when the client is created.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any check fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max iterations must be at least 1".to_string(),
            ));
        }
        if self.max_iterations > 50 {
            return Err(ConfigError::ValidationFailed(
                "Max iterations cannot exceed 50".to_string(),
            ));
        }

        if self.dataset_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Dataset path must not be empty".to_string(),
            ));
        }

        if self.embeddings_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Embeddings URL must not be empty".to_string(),
            ));
        }

        if self.embeddings_dimensions == 0 {
            return Err(ConfigError::ValidationFailed(
                "Embeddings dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Converts configuration to a display map for output formatting
    ///
    /// # Returns
    ///
    /// A HashMap suitable for JSON/YAML serialization or display
    pub fn to_display_map(&self) -> std::collections::HashMap<String, String> {
        let mut map = std::collections::HashMap::new();

        map.insert("provider".to_string(), format!("{:?}", self.provider));
        map.insert("model".to_string(), self.model.clone());
        map.insert("mode".to_string(), self.mode.to_string());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "max_iterations".to_string(),
            self.max_iterations.to_string(),
        );
        map.insert(
            "dataset_path".to_string(),
            self.dataset_path.display().to_string(),
        );
        map.insert("embeddings_url".to_string(), self.embeddings_url.clone());
        map.insert(
            "embeddings_model".to_string(),
            self.embeddings_model.clone(),
        );
        map.insert(
            "embeddings_dimensions".to_string(),
            self.embeddings_dimensions.to_string(),
        );
        map.insert("cache_enabled".to_string(), self.cache_enabled.to_string());

        map
    }
}

impl fmt::Display for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bitext-agent Configuration:")?;
        writeln!(f, "  Provider: {:?}", self.provider)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Mode: {}", self.mode)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Iterations: {}", self.max_iterations)?;
        writeln!(f, "  Dataset: {}", self.dataset_path.display())?;
        writeln!(f, "  Embeddings URL: {}", self.embeddings_url)?;
        writeln!(f, "  Embeddings Model: {}", self.embeddings_model)?;
        writeln!(
            f,
            "  Embeddings Dimensions: {}",
            self.embeddings_dimensions
        )?;
        writeln!(f, "  Cache Enabled: {}", self.cache_enabled)?;
        Ok(())
    }
}
