use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::types::ScopeCheck;
use crate::llm::{BackendError, ChatMessage, LLMClient, LLMRequest, MessageRole, ParseError};

const SCOPE_PROMPT: &str = r#"You are a scope checker for the Bitext Customer Support Service dataset.

A question is IN SCOPE if it asks about:
- General information about the dataset (e.g., what is the dataset about, what is the purpose of the dataset, etc.)
- General information about the services of the agent (e.g., what services do you offer, what is your purpose, etc.)
- Categories in the dataset (e.g., ACCOUNT, REFUND, ORDER)
- Examples or patterns within categories
- Intent distributions or common patterns
- Any analysis or information that can be derived from the dataset
- Data analysis tasks that use the dataset (e.g., creating FAQs, analyzing patterns, summarizing categories)
- Creating deliverables from the dataset (e.g., reports, summaries, FAQs, guides)
- Queries that require searching or analyzing the dataset using available tools

A question is OUT OF SCOPE if it asks about:
- Public figures or people not in the dataset
- General knowledge not related to customer service
- Topics completely unrelated to the dataset
- Claims about data existence that cannot be verified in the dataset

IMPORTANT:
- If the query is vague but likely related to the dataset (e.g., about agents, services, or responses), classify it as 'in_scope'.
- If the query is about analyzing the dataset or creating deliverables from it, classify it as 'in_scope'.
- If the query requires using any of the dataset's tools or capabilities, classify it as 'in_scope'.
- If someone claims something exists in the dataset, it must be verified before classifying as 'out_of_scope'.

Examples:
- 'What services do you offer?' -> in_scope
- 'Who are you?' -> in_scope
- 'What categories exist?' -> in_scope
- 'How do agents typically respond to account-related issues?' -> in_scope
- 'Create a FAQ about refunds' -> in_scope
- 'Analyze common patterns in customer questions' -> in_scope
- 'Search for questions about refunds' -> in_scope
- 'Tell me about Elon Musk' -> out_of_scope
- 'What's the weather today?' -> out_of_scope
- 'I think Benjamin Button appears in the dataset' -> in_scope (needs verification)
- 'Tell me about Benjamin Button' -> out_of_scope (not claiming it's in the dataset)

Respond with a JSON object:
{"verdict": "in_scope" or "out_of_scope", "reasoning": "a short explanation of the decision"}"#;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Classifies user questions as in or out of the dataset's scope.
///
/// Off-topic questions (weather, celebrities) are rejected before the agent
/// spends any tool calls on them. Questions about categories, patterns, or
/// anything derivable from the dataset pass through.
pub struct ScopeChecker {
    llm: Arc<dyn LLMClient>,
}

impl ScopeChecker {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Classify a user message, using prior user-facing turns as context
    pub async fn check(
        &self,
        user_message: &str,
        history: &[ChatMessage],
    ) -> Result<ScopeCheck, ScopeError> {
        let message = contextualize(user_message, history);
        debug!(message_len = message.len(), "Running scope check");

        let request = LLMRequest::new(vec![
            ChatMessage::system(SCOPE_PROMPT),
            ChatMessage::user(message),
        ]);

        let response = self.llm.chat(request).await?;
        let check = ScopeCheck::parse(&response.content)?;

        info!(verdict = %check.verdict, reasoning = %check.reasoning, "Scope check completed");
        Ok(check)
    }
}

/// Prefixes the message with a transcript of earlier user-facing turns
fn contextualize(user_message: &str, history: &[ChatMessage]) -> String {
    let transcript: Vec<String> = history
        .iter()
        .filter(|m| m.is_user_facing())
        .map(|m| {
            let speaker = if m.role == MessageRole::User {
                "User"
            } else {
                "Assistant"
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect();

    if transcript.is_empty() {
        user_message.to_string()
    } else {
        format!(
            "Previous conversation:\n{}\n\nCurrent message:\n{}",
            transcript.join("\n"),
            user_message
        )
    }
}
