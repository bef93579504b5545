use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub struct MockLLMClient {
    responses: Mutex<VecDeque<MockResponse>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub error: Option<BackendError>,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            error: None,
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
            error: None,
        }
    }

    pub fn error(error: BackendError) -> Self {
        Self {
            content: String::new(),
            tool_calls: Vec::new(),
            error: Some(error),
        }
    }
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            name: "MockLLM".to_string(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn dataset_info_call(call_id: impl Into<String>) -> ToolCall {
        ToolCall {
            call_id: call_id.into(),
            name: "dataset_info".to_string(),
            arguments: serde_json::json!({}),
        }
    }

    pub fn exact_search_call(
        call_id: impl Into<String>,
        text: impl Into<String>,
        column: Option<&str>,
    ) -> ToolCall {
        let mut arguments = serde_json::json!({ "text": text.into() });
        if let Some(column) = column {
            arguments["column"] = serde_json::Value::String(column.to_string());
        }
        ToolCall {
            call_id: call_id.into(),
            name: "exact_search".to_string(),
            arguments,
        }
    }

    pub fn aggregator_call(
        call_id: impl Into<String>,
        group_by: impl Into<String>,
        metrics: Vec<&str>,
    ) -> ToolCall {
        ToolCall {
            call_id: call_id.into(),
            name: "aggregator".to_string(),
            arguments: serde_json::json!({
                "group_by": [group_by.into()],
                "metrics": metrics
            }),
        }
    }

    pub fn calculator_call(call_id: impl Into<String>, expression: impl Into<String>) -> ToolCall {
        ToolCall {
            call_id: call_id.into(),
            name: "calculator".to_string(),
            arguments: serde_json::json!({ "expression": expression.into() }),
        }
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn chat(&self, _request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let response =
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::Other {
                    message: "MockLLMClient: No more responses in queue".to_string(),
                })?;

        // Return error if configured
        if let Some(error) = response.error {
            return Err(error);
        }

        if response.tool_calls.is_empty() {
            Ok(LLMResponse::text(response.content, Duration::from_millis(10)))
        } else {
            Ok(LLMResponse::with_tool_calls(
                response.content,
                response.tool_calls,
                Duration::from_millis(10),
            ))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}
