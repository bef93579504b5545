//! Plan strategy: outline every step up front, then execute

use async_trait::async_trait;
use tracing::{debug, info};

use super::prompts;
use super::response::PlanOutline;
use super::strategy::{Answer, Strategy, ToolRunner};
use super::AgentError;
use crate::llm::ChatMessage;
use crate::progress::ProgressEvent;

/// Asks the model for a complete plan before touching any tool, then walks
/// the steps in order. Steps whose action mentions a tool get a tools-enabled
/// chat round; the rest only advance the transcript.
pub struct PlanStrategy {
    runner: ToolRunner,
}

impl PlanStrategy {
    pub(crate) fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Requests the structured plan with the planning prompt appended last
    async fn outline(&self, messages: &[ChatMessage]) -> Result<PlanOutline, AgentError> {
        let mut modified = messages.to_vec();
        modified.push(ChatMessage::system(prompts::PLANNING_PROMPT));

        let response = self.runner.chat(modified).await?;
        Ok(PlanOutline::parse(&response.content)?)
    }
}

#[async_trait]
impl Strategy for PlanStrategy {
    fn system_prompt(&self) -> String {
        format!(
            "{}\n\n{}",
            self.runner.base_prompt(),
            prompts::PLANNING_INSTRUCTIONS
        )
    }

    async fn think(
        &self,
        history: &[ChatMessage],
    ) -> Result<(Answer, Vec<ChatMessage>), AgentError> {
        let plan = self.outline(history).await?;
        let rendered = plan.render();
        info!(goal = %plan.goal, steps = plan.steps.len(), "Plan ready");

        let mut working = history.to_vec();
        let mut new_msgs = Vec::new();

        let plan_msg = ChatMessage::thinking(
            rendered.clone(),
            format!("Planning to achieve: {}", plan.goal),
        );
        working.push(plan_msg.clone());
        new_msgs.push(plan_msg);

        self.runner.progress().handle(&ProgressEvent::PlanReady {
            goal: plan.goal.clone(),
            rendered,
        });

        let total = plan.steps.len();
        for (i, step) in plan.steps.iter().enumerate() {
            debug!(step = i + 1, total, action = %step.action, "Executing plan step");

            let step_msg = ChatMessage::thinking(step.action.clone(), step.reasoning.clone());
            working.push(step_msg.clone());
            new_msgs.push(step_msg);

            self.runner
                .progress()
                .handle(&ProgressEvent::PlanStepStarted {
                    index: i + 1,
                    total,
                    reasoning: step.reasoning.clone(),
                });

            if step.action.to_lowercase().contains("tool") {
                let response = self.runner.chat_with_tools(working.clone()).await?;

                if response.has_tool_calls() {
                    self.runner
                        .run_tool_calls(&response, &mut working, &mut new_msgs)
                        .await;
                }
            }
        }

        let answer = self.runner.final_response(&working).await?;
        Ok((answer, new_msgs))
    }
}
