//! LLM client abstraction layer
//!
//! This module provides a trait-based abstraction for LLM communication,
//! allowing different backends (GenAI, Mock) to be used interchangeably.

mod client;
mod error;
mod genai;
mod mock;
pub mod structured;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::GenAIClient;
pub use mock::{MockLLMClient, MockResponse};
pub use structured::{extract_json_block, parse_structured, ParseError};
pub use types::{
    ChatMessage, LLMRequest, LLMResponse, MessageKind, MessageRole, ToolCall, ToolDefinition,
};
