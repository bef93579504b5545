//! Strategy trait and the plumbing both strategies share

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::prompts;
use super::response::FinalResponse;
use super::AgentError;
use crate::dataset::DatasetStore;
use crate::llm::{BackendError, ChatMessage, LLMClient, LLMRequest, LLMResponse};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::tools::{dataset_overview, ToolSystem};

/// Stands in for assistant text when the model calls tools without a word
const TOOL_CALL_PLACEHOLDER: &str = "Taking actions to gather the required information...";

/// The agent's answer to one question
#[derive(Debug, Clone)]
pub struct Answer {
    pub content: String,
    pub reasoning: String,
}

/// How the agent works a conversation toward an answer
#[async_trait]
pub trait Strategy: Send + Sync {
    /// System prompt that seeds a fresh conversation
    fn system_prompt(&self) -> String;

    /// Produce an answer plus the messages generated along the way
    async fn think(
        &self,
        history: &[ChatMessage],
    ) -> Result<(Answer, Vec<ChatMessage>), AgentError>;
}

/// Shared machinery: LLM access, tool dispatch, transcript bookkeeping
pub(crate) struct ToolRunner {
    llm: Arc<dyn LLMClient>,
    tools: Arc<ToolSystem>,
    store: Arc<DatasetStore>,
    progress: Arc<dyn ProgressHandler>,
}

impl ToolRunner {
    pub(crate) fn new(
        llm: Arc<dyn LLMClient>,
        tools: Arc<ToolSystem>,
        store: Arc<DatasetStore>,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            llm,
            tools,
            store,
            progress,
        }
    }

    pub(crate) fn progress(&self) -> &dyn ProgressHandler {
        self.progress.as_ref()
    }

    /// Base system prompt: tool documentation plus a dataset overview
    pub(crate) fn base_prompt(&self) -> String {
        let overview = serde_json::to_string_pretty(&dataset_overview(&self.store))
            .unwrap_or_default();
        prompts::base_prompt(&self.tools.documentation(), &overview)
    }

    /// Plain chat, no tools offered
    pub(crate) async fn chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<LLMResponse, BackendError> {
        self.llm.chat(LLMRequest::new(messages)).await
    }

    /// Chat with every tool schema attached
    pub(crate) async fn chat_with_tools(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<LLMResponse, BackendError> {
        let request = LLMRequest::new(messages).with_tools(self.tools.as_tool_definitions());
        self.llm.chat(request).await
    }

    /// Executes every tool call in the response and appends the transcript
    /// messages: one assistant tool-call message, then one tool result each.
    pub(crate) async fn run_tool_calls(
        &self,
        response: &LLMResponse,
        working: &mut Vec<ChatMessage>,
        new_msgs: &mut Vec<ChatMessage>,
    ) {
        let content = response.content.trim();
        let content = if content.is_empty() {
            TOOL_CALL_PLACEHOLDER
        } else {
            content
        };

        let assistant = ChatMessage::assistant_with_tools(content, response.tool_calls.clone())
            .with_reasoning(content);
        working.push(assistant.clone());
        new_msgs.push(assistant);

        self.progress.handle(&ProgressEvent::ToolCallsPlanned {
            reasoning: content.to_string(),
        });

        for call in &response.tool_calls {
            let args_display = call.arguments.to_string();
            debug!(tool = %call.name, args = %args_display, "Running tool call");

            self.progress.handle(&ProgressEvent::ToolCallStarted {
                tool_name: call.name.clone(),
                arguments: args_display.clone(),
            });

            let result = self.tools.execute(&call.name, call.arguments.clone()).await;

            self.progress.handle(&ProgressEvent::ToolCallComplete {
                tool_name: call.name.clone(),
                summary: summarize(&result),
            });

            let tool_msg = ChatMessage::tool_response(
                call.call_id.clone(),
                serde_json::to_string(&result).unwrap_or_default(),
            )
            .with_reasoning(format!(
                "Tool {} executed with args: {}",
                call.name, args_display
            ));

            working.push(tool_msg.clone());
            new_msgs.push(tool_msg);
        }
    }

    /// Asks the model to wrap up and parses the structured answer
    pub(crate) async fn final_response(
        &self,
        working: &[ChatMessage],
    ) -> Result<Answer, AgentError> {
        let mut messages = working.to_vec();
        messages.push(ChatMessage::system(prompts::FINAL_PROMPT));

        let response = self.chat(messages).await?;
        let parsed = FinalResponse::parse(&response.content)?;

        info!("Final answer ready");
        self.progress.handle(&ProgressEvent::AnswerReady {
            reasoning: parsed.reasoning.clone(),
        });

        Ok(Answer {
            content: parsed.content,
            reasoning: parsed.reasoning,
        })
    }
}

/// One-line description of a tool result for the thinking trace
fn summarize(result: &Value) -> String {
    match result {
        Value::Array(items) => format!("returned {} items", items.len()),
        Value::Object(map) => match map.get("count") {
            Some(count) => format!("found {} matches", count),
            None => format!("returned {} key-value pairs", map.len()),
        },
        _ => "execution completed".to_string(),
    }
}
