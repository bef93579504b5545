//! bitext-agent - conversational agent over the Bitext customer support dataset
//!
//! This library implements an LLM-driven question-answering agent for the Bitext
//! Customer Support dataset. Incoming questions pass a scope gate, then a thinking
//! strategy (reactive or plan-based) drives tool calls against the in-memory
//! dataset until it can produce a final answer.
//!
//! # Core Concepts
//!
//! - **Scope gate**: every question is classified first; questions the dataset
//!   cannot answer get a fixed refusal instead of a tool run
//! - **Strategies**: reactive mode decides one step at a time, plan mode produces
//!   an ordered step list up front and executes it
//! - **Tools**: named dataset operations (search, filter, aggregate, cluster,
//!   calculate) the LLM invokes with structured JSON arguments; failures come
//!   back as JSON error objects the model can react to
//!
//! # Example Usage
//!
//! ```ignore
//! use bitext_agent::agent::{Agent, AgentMode};
//! use bitext_agent::dataset::DatasetStore;
//! use bitext_agent::embedding::HttpEmbedder;
//! use bitext_agent::llm::GenAIClient;
//! use bitext_agent::progress::NoOpProgressHandler;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn answer(question: &str) -> Result<String, Box<dyn std::error::Error>> {
//!     let store = Arc::new(DatasetStore::load("data/bitext.json")?);
//!     let embedder = Arc::new(HttpEmbedder::new(
//!         "https://api.openai.com/v1".to_string(),
//!         "text-embedding-3-small".to_string(),
//!         1536,
//!     ));
//!     let llm = Arc::new(
//!         GenAIClient::new(
//!             genai::adapter::AdapterKind::OpenAI,
//!             "gpt-4o-mini".to_string(),
//!             Duration::from_secs(120),
//!         )
//!         .await?,
//!     );
//!
//!     let agent = Agent::new(
//!         llm,
//!         store,
//!         embedder,
//!         AgentMode::Reactive,
//!         10,
//!         Arc::new(NoOpProgressHandler),
//!     );
//!
//!     let (answer, _history) = agent.ask(question, None).await?;
//!     Ok(answer.content)
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`agent`]: the control loop, thinking strategies, and structured responses
//! - [`scope`]: the in-scope/out-of-scope classifier
//! - [`tools`]: tool registry, dispatch, and the dataset operations themselves
//! - [`dataset`]: the in-memory record store
//! - [`llm`] / [`embedding`]: chat and embedding backends behind traits
//!
//! # Features
//!
//! - Multi-provider chat backends via `genai` (OpenAI, Anthropic, Gemini, Ollama, ...)
//! - Scope gating with a fixed refusal for off-topic questions
//! - Reactive and plan-based agent strategies
//! - Tool errors as data, so the model can correct its own calls
//! - Deterministic mock backends for offline tests

// Public modules
pub mod agent;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod llm;
pub mod progress;
pub mod scope;
pub mod tools;
pub mod util;

// Re-export key types for convenient access
pub use agent::{Agent, AgentError, AgentMode, Answer, OUT_OF_SCOPE_REPLY};
pub use config::{AgentConfig, ConfigError};
pub use dataset::{DatasetStore, SupportRecord};
pub use embedding::{Embedder, HttpEmbedder, MockEmbedder};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient};
pub use progress::{ConsoleProgressHandler, NoOpProgressHandler, ProgressEvent, ProgressHandler};
pub use scope::{ScopeCheck, ScopeChecker, ScopeVerdict};
pub use tools::{ToolRegistry, ToolSystem};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
