//! The agent control loop
//!
//! Ties the scope gate, a thinking strategy, and the tool system together.
//! `Agent::ask` takes one user message (plus optional prior history) and
//! produces a user-facing answer together with the full message transcript,
//! so callers can thread the history back in for multi-turn chat.

mod plan;
mod prompts;
mod reactive;
mod response;
mod strategy;

pub use plan::PlanStrategy;
pub use reactive::ReactiveStrategy;
pub use response::{FinalResponse, PlanOutline, PlanStep, ThinkingStep};
pub use strategy::{Answer, Strategy};

pub(crate) use strategy::ToolRunner;

use std::sync::Arc;

use clap::ValueEnum;
use thiserror::Error;
use tracing::info;

use crate::dataset::DatasetStore;
use crate::embedding::Embedder;
use crate::llm::{BackendError, ChatMessage, LLMClient, ParseError};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::scope::{ScopeChecker, ScopeError};
use crate::tools::ToolSystem;

/// Default cap on reactive think/act rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Fixed reply for questions the scope checker rejects
pub const OUT_OF_SCOPE_REPLY: &str = "I apologize, but I can only answer questions \
about the Bitext Customer Support Service dataset. Your question appears to be about \
something else.";

/// Errors surfaced by the agent loop
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("Agent exceeded {limit} iterations without reaching an answer")]
    IterationLimit { limit: usize },
}

/// How the agent decides what to do next
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    /// Think one step at a time, calling tools as needed
    Reactive,
    /// Produce a full plan up front, then execute it
    Plan,
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::Reactive => write!(f, "reactive"),
            AgentMode::Plan => write!(f, "plan"),
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reactive" => Ok(AgentMode::Reactive),
            "plan" => Ok(AgentMode::Plan),
            other => Err(format!(
                "mode must be 'reactive' or 'plan', got '{}'",
                other
            )),
        }
    }
}

/// A scope-gated, tool-calling agent over the support dataset
pub struct Agent {
    strategy: Box<dyn Strategy>,
    scope: ScopeChecker,
    progress: Arc<dyn ProgressHandler>,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        store: Arc<DatasetStore>,
        embedder: Arc<dyn Embedder>,
        mode: AgentMode,
        max_iterations: usize,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        let tools = Arc::new(ToolSystem::new(Arc::clone(&store), embedder));
        Self::from_parts(llm, tools, store, mode, max_iterations, progress)
    }

    /// Builds an agent around an already-configured tool system, for callers
    /// that need control over caching or the registry.
    pub fn from_parts(
        llm: Arc<dyn LLMClient>,
        tools: Arc<ToolSystem>,
        store: Arc<DatasetStore>,
        mode: AgentMode,
        max_iterations: usize,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        let runner = ToolRunner::new(
            Arc::clone(&llm),
            tools,
            store,
            Arc::clone(&progress),
        );

        let strategy: Box<dyn Strategy> = match mode {
            AgentMode::Reactive => Box::new(ReactiveStrategy::new(runner, max_iterations)),
            AgentMode::Plan => Box::new(PlanStrategy::new(runner)),
        };

        Self {
            strategy,
            scope: ScopeChecker::new(llm),
            progress,
        }
    }

    /// Answer one user message.
    ///
    /// The returned history contains everything: the system prompt (on the
    /// first turn), the user message, thinking and tool messages, and the
    /// final assistant answer. Pass it back in to continue the conversation.
    pub async fn ask(
        &self,
        user_message: &str,
        chat_history: Option<Vec<ChatMessage>>,
    ) -> Result<(Answer, Vec<ChatMessage>), AgentError> {
        let mut history = match chat_history {
            Some(prior) if !prior.is_empty() => prior,
            _ => vec![ChatMessage::system(self.strategy.system_prompt())],
        };
        history.push(ChatMessage::user(user_message));

        // The history handed to the scope checker already holds the current
        // message, so only earlier turns contribute conversation context.
        let check = self.scope.check(user_message, &history).await?;

        self.progress.handle(&ProgressEvent::ScopeChecked {
            verdict: check.verdict.to_string(),
            reasoning: check.reasoning.clone(),
        });

        history.push(ChatMessage::thinking(
            format!("Scope check: {}", check.verdict),
            check.reasoning.clone(),
        ));

        if !check.is_in_scope() {
            info!(reasoning = %check.reasoning, "Question rejected as out of scope");
            let answer = Answer {
                content: OUT_OF_SCOPE_REPLY.to_string(),
                reasoning: check.reasoning,
            };
            history.push(
                ChatMessage::assistant(answer.content.clone())
                    .with_reasoning(answer.reasoning.clone()),
            );
            return Ok((answer, history));
        }

        let (answer, new_msgs) = self.strategy.think(&history).await?;
        history.extend(new_msgs);
        history.push(
            ChatMessage::assistant(answer.content.clone())
                .with_reasoning(answer.reasoning.clone()),
        );

        Ok((answer, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SupportRecord;
    use crate::embedding::MockEmbedder;
    use crate::llm::{MessageKind, MockLLMClient, MockResponse};
    use crate::progress::NoOpProgressHandler;
    use std::str::FromStr;

    fn agent_with(llm: Arc<MockLLMClient>, mode: AgentMode) -> Agent {
        let store = Arc::new(DatasetStore::from_records(vec![SupportRecord {
            instruction: "cancel my order please".to_string(),
            response: "I will cancel it right away".to_string(),
            category: "ORDER".to_string(),
            intent: "cancel_order".to_string(),
            flags: "B".to_string(),
        }]));
        Agent::new(
            llm,
            store,
            Arc::new(MockEmbedder::new(8)),
            mode,
            DEFAULT_MAX_ITERATIONS,
            Arc::new(NoOpProgressHandler),
        )
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            <AgentMode as FromStr>::from_str("reactive").unwrap(),
            AgentMode::Reactive
        );
        assert_eq!(
            <AgentMode as FromStr>::from_str("PLAN").unwrap(),
            AgentMode::Plan
        );
        assert_eq!(
            <AgentMode as FromStr>::from_str("Reactive").unwrap(),
            AgentMode::Reactive
        );
        assert!(<AgentMode as FromStr>::from_str("autopilot").is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(AgentMode::Reactive.to_string(), "reactive");
        assert_eq!(AgentMode::Plan.to_string(), "plan");
    }

    #[tokio::test]
    async fn test_ask_in_scope() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(
                r#"{"verdict": "in_scope", "reasoning": "Asks about dataset categories"}"#,
            ),
            MockResponse::text(
                r#"{"reasoning": "The overview already lists them", "use_tool": false, "next_step": "Answer directly"}"#,
            ),
            MockResponse::text(
                r#"{"content": "The dataset covers ORDER among other categories.", "reasoning": "Read from the overview"}"#,
            ),
        ]);

        let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive);
        let (answer, history) = agent
            .ask("What categories does the dataset have?", None)
            .await
            .unwrap();

        assert_eq!(
            answer.content,
            "The dataset covers ORDER among other categories."
        );
        // system, user, scope thinking, step thinking, assistant
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].kind, MessageKind::System);
        assert!(history[2].content.starts_with("Scope check: in_scope"));
        assert_eq!(history[4].kind, MessageKind::UserFacing);
        assert_eq!(llm.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_ask_out_of_scope_short_circuits() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_response(MockResponse::text(
            r#"{"verdict": "out_of_scope", "reasoning": "Weather is not in the dataset"}"#,
        ));

        let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive);
        let (answer, history) = agent.ask("What's the weather today?", None).await.unwrap();

        assert_eq!(answer.content, OUT_OF_SCOPE_REPLY);
        assert_eq!(answer.reasoning, "Weather is not in the dataset");
        // system, user, scope thinking, apology
        assert_eq!(history.len(), 4);
        assert!(history[2].content.starts_with("Scope check: out_of_scope"));
        // No thinking or tool rounds ran
        assert_eq!(llm.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_ask_threads_history_between_turns() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(r#"{"verdict": "in_scope", "reasoning": "Dataset question"}"#),
            MockResponse::text(
                r#"{"reasoning": "No tool needed", "use_tool": false, "next_step": "Answer"}"#,
            ),
            MockResponse::text(r#"{"content": "27 categories.", "reasoning": "From overview"}"#),
            MockResponse::text(r#"{"verdict": "in_scope", "reasoning": "Follow-up"}"#),
            MockResponse::text(
                r#"{"reasoning": "Still no tool needed", "use_tool": false, "next_step": "Answer"}"#,
            ),
            MockResponse::text(r#"{"content": "ORDER is one of them.", "reasoning": "Recall"}"#),
        ]);

        let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive);
        let (_, history) = agent.ask("How many categories?", None).await.unwrap();
        let first_len = history.len();

        let (answer, history) = agent.ask("Name one of them", Some(history)).await.unwrap();

        assert_eq!(answer.content, "ORDER is one of them.");
        assert!(history.len() > first_len);
        // The follow-up turn must not have re-inserted a system prompt
        let system_count = history
            .iter()
            .filter(|m| m.kind == MessageKind::System)
            .count();
        assert_eq!(system_count, 1);
    }

    #[tokio::test]
    async fn test_ask_with_empty_history_starts_fresh() {
        let llm = Arc::new(MockLLMClient::new());
        llm.add_responses(vec![
            MockResponse::text(r#"{"verdict": "in_scope", "reasoning": "Dataset question"}"#),
            MockResponse::text(
                r#"{"reasoning": "No tool needed", "use_tool": false, "next_step": "Answer"}"#,
            ),
            MockResponse::text(r#"{"content": "Done.", "reasoning": "Direct"}"#),
        ]);

        let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive);
        let (_, history) = agent
            .ask("Describe the dataset", Some(Vec::new()))
            .await
            .unwrap();

        assert_eq!(history[0].kind, MessageKind::System);
    }
}
