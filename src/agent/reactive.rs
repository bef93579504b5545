//! Reactive strategy: decide one step at a time

use async_trait::async_trait;
use tracing::debug;

use super::prompts;
use super::response::ThinkingStep;
use super::strategy::{Answer, Strategy, ToolRunner};
use super::AgentError;
use crate::llm::{ChatMessage, MessageRole};
use crate::progress::ProgressEvent;

/// Loops thinking step by thinking step until the model stops asking for
/// tools, then requests the final answer.
pub struct ReactiveStrategy {
    runner: ToolRunner,
    max_iterations: usize,
}

impl ReactiveStrategy {
    pub(crate) fn new(runner: ToolRunner, max_iterations: usize) -> Self {
        Self {
            runner,
            max_iterations,
        }
    }

    /// Asks for a structured thinking step over a re-framed history
    ///
    /// The original system prompt becomes a user message so the thinking
    /// prompt is the only system instruction the model sees.
    async fn next_thinking_step(
        &self,
        messages: &[ChatMessage],
    ) -> Result<ThinkingStep, AgentError> {
        let mut modified = messages.to_vec();
        if let Some(first) = modified.first_mut() {
            if first.role == MessageRole::System {
                *first = ChatMessage::user(first.content.clone());
            }
        }
        modified.insert(0, ChatMessage::system(prompts::THINKING_PROMPT));

        let response = self.runner.chat(modified).await?;
        Ok(ThinkingStep::parse(&response.content)?)
    }
}

#[async_trait]
impl Strategy for ReactiveStrategy {
    fn system_prompt(&self) -> String {
        format!(
            "{}\n\n{}",
            self.runner.base_prompt(),
            prompts::REACTIVE_INSTRUCTIONS
        )
    }

    async fn think(
        &self,
        history: &[ChatMessage],
    ) -> Result<(Answer, Vec<ChatMessage>), AgentError> {
        let mut working = history.to_vec();
        let mut new_msgs = Vec::new();

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Reactive thinking step");

            let step = self.next_thinking_step(&working).await?;

            let thinking = ChatMessage::thinking(step.next_step.clone(), step.reasoning.clone());
            working.push(thinking.clone());
            new_msgs.push(thinking);

            self.runner.progress().handle(&ProgressEvent::ThinkingStep {
                reasoning: step.reasoning.clone(),
                next_step: step.next_step.clone(),
            });

            if !step.use_tool {
                let answer = self.runner.final_response(&working).await?;
                return Ok((answer, new_msgs));
            }

            let response = self.runner.chat_with_tools(working.clone()).await?;

            if response.has_tool_calls() {
                self.runner
                    .run_tool_calls(&response, &mut working, &mut new_msgs)
                    .await;
                continue;
            }

            // The model was offered tools and declined, it is done gathering
            let answer = self.runner.final_response(&working).await?;
            return Ok((answer, new_msgs));
        }

        Err(AgentError::IterationLimit {
            limit: self.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetStore, SupportRecord};
    use crate::embedding::MockEmbedder;
    use crate::llm::{MessageKind, MockLLMClient, MockResponse};
    use crate::progress::NoOpProgressHandler;
    use crate::tools::ToolSystem;
    use std::sync::Arc;

    fn strategy_with(llm: Arc<MockLLMClient>, max_iterations: usize) -> ReactiveStrategy {
        let store = Arc::new(DatasetStore::from_records(vec![SupportRecord {
            instruction: "I want to cancel my order".to_string(),
            response: "I can help with the cancellation".to_string(),
            category: "ORDER".to_string(),
            intent: "cancel_order".to_string(),
            flags: "B".to_string(),
        }]));
        let tools = Arc::new(ToolSystem::new(
            Arc::clone(&store),
            Arc::new(MockEmbedder::new(8)),
        ));
        let runner = ToolRunner::new(llm, tools, store, Arc::new(NoOpProgressHandler));
        ReactiveStrategy::new(runner, max_iterations)
    }

    #[tokio::test]
    async fn test_answers_without_tools() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(
                r#"{"reasoning": "The answer is in the prompt already", "use_tool": false, "next_step": "Answer directly"}"#,
            ),
            MockResponse::text(
                r#"{"content": "The dataset has one entry.", "reasoning": "Read from the overview"}"#,
            ),
        ]);

        let strategy = strategy_with(Arc::clone(&llm), 10);
        let history = vec![ChatMessage::user("How many entries are there?")];

        let (answer, new_msgs) = strategy.think(&history).await.unwrap();

        assert_eq!(answer.content, "The dataset has one entry.");
        assert_eq!(new_msgs.len(), 1);
        assert_eq!(new_msgs[0].kind, MessageKind::Thinking);
        assert_eq!(llm.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_tool_loop_then_answer() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(
                r#"{"reasoning": "Need to look up cancel requests", "use_tool": true, "next_step": "Search for cancel"}"#,
            ),
            MockResponse::with_tool_calls(
                "",
                vec![MockLLMClient::exact_search_call("call_1", "cancel", None)],
            ),
            MockResponse::text(
                r#"{"reasoning": "Search results cover the question", "use_tool": false, "next_step": "Summarize the matches"}"#,
            ),
            MockResponse::text(
                r#"{"content": "One customer asked to cancel.", "reasoning": "Single match found"}"#,
            ),
        ]);

        let strategy = strategy_with(Arc::clone(&llm), 10);
        let history = vec![ChatMessage::user("Who asked about cancelling?")];

        let (answer, new_msgs) = strategy.think(&history).await.unwrap();

        assert_eq!(answer.content, "One customer asked to cancel.");
        // thinking, tool call, tool result, thinking
        assert_eq!(new_msgs.len(), 4);
        assert_eq!(new_msgs[1].kind, MessageKind::ToolCall);
        assert_eq!(new_msgs[2].kind, MessageKind::ToolResult);
        assert!(new_msgs[2].content.contains("cancel my order"));
    }

    #[tokio::test]
    async fn test_tools_offered_but_declined() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(
                r#"{"reasoning": "A search may help", "use_tool": true, "next_step": "Search the dataset"}"#,
            ),
            // tools offered, model answers in plain text instead
            MockResponse::text("Nothing further needed."),
            MockResponse::text(
                r#"{"content": "Done.", "reasoning": "The model had everything"}"#,
            ),
        ]);

        let strategy = strategy_with(Arc::clone(&llm), 10);
        let history = vec![ChatMessage::user("Anything else?")];

        let (answer, _) = strategy.think(&history).await.unwrap();

        assert_eq!(answer.content, "Done.");
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let llm = Arc::new(MockLLMClient::new());
        // Every round wants a tool; the loop must give up at the limit
        for i in 0..2 {
            llm.add_response(MockResponse::text(
                r#"{"reasoning": "still digging", "use_tool": true, "next_step": "Search again"}"#,
            ));
            llm.add_response(MockResponse::with_tool_calls(
                "",
                vec![MockLLMClient::exact_search_call(
                    format!("call_{}", i),
                    "order",
                    None,
                )],
            ));
        }

        let strategy = strategy_with(Arc::clone(&llm), 2);
        let history = vec![ChatMessage::user("Keep searching forever")];

        let result = strategy.think(&history).await;

        assert!(matches!(
            result,
            Err(AgentError::IterationLimit { limit: 2 })
        ));
    }
}
