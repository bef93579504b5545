//! Structured responses the agent asks the model for
//!
//! Each type comes in two layers: a raw serde struct where every field is
//! optional (models drop fields under pressure) and the validated form the
//! strategies actually work with.

use serde::Deserialize;

use crate::llm::{parse_structured, ParseError};

/// One reactive thinking step: should a tool run next, and why
#[derive(Debug, Clone)]
pub struct ThinkingStep {
    pub reasoning: String,
    pub use_tool: bool,
    pub next_step: String,
}

#[derive(Debug, Deserialize)]
struct RawThinkingStep {
    reasoning: Option<String>,
    use_tool: Option<bool>,
    next_step: Option<String>,
}

impl ThinkingStep {
    pub fn parse(response: &str) -> Result<Self, ParseError> {
        let raw: RawThinkingStep = parse_structured(response)?;

        Ok(Self {
            reasoning: raw
                .reasoning
                .ok_or_else(|| ParseError::MissingField("reasoning".to_string()))?,
            use_tool: raw
                .use_tool
                .ok_or_else(|| ParseError::MissingField("use_tool".to_string()))?,
            next_step: raw
                .next_step
                .ok_or_else(|| ParseError::MissingField("next_step".to_string()))?,
        })
    }
}

/// One step of a plan
#[derive(Debug, Clone)]
pub struct PlanStep {
    pub reasoning: String,
    pub action: String,
    pub expected_result: String,
    /// Zero-based indices of steps this one builds on
    pub depends_on: Vec<usize>,
}

/// A full plan: overall goal plus ordered steps
#[derive(Debug, Clone)]
pub struct PlanOutline {
    pub goal: String,
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Deserialize)]
struct RawPlanStep {
    reasoning: Option<String>,
    action: Option<String>,
    expected_result: Option<String>,
    #[serde(default)]
    depends_on: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct RawPlanOutline {
    goal: Option<String>,
    steps: Option<Vec<RawPlanStep>>,
}

impl PlanOutline {
    pub fn parse(response: &str) -> Result<Self, ParseError> {
        let raw: RawPlanOutline = parse_structured(response)?;

        let goal = raw
            .goal
            .ok_or_else(|| ParseError::MissingField("goal".to_string()))?;
        let raw_steps = raw
            .steps
            .ok_or_else(|| ParseError::MissingField("steps".to_string()))?;
        if raw_steps.is_empty() {
            return Err(ParseError::Other("Plan contains no steps".to_string()));
        }

        let steps = raw_steps
            .into_iter()
            .map(|step| {
                Ok(PlanStep {
                    reasoning: step
                        .reasoning
                        .ok_or_else(|| ParseError::MissingField("reasoning".to_string()))?,
                    action: step
                        .action
                        .ok_or_else(|| ParseError::MissingField("action".to_string()))?,
                    expected_result: step
                        .expected_result
                        .ok_or_else(|| ParseError::MissingField("expected_result".to_string()))?,
                    depends_on: step.depends_on,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Self { goal, steps })
    }

    /// Renders the plan as the numbered text shown in the thinking trace
    pub fn render(&self) -> String {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let mut text = format!(
                    "{}. {}\n   Expected: {}\n   Reasoning: {}",
                    i + 1,
                    step.action,
                    step.expected_result,
                    step.reasoning
                );
                if !step.depends_on.is_empty() {
                    let shown: Vec<usize> = step.depends_on.iter().map(|d| d + 1).collect();
                    text.push_str(&format!("\n   Depends on: {:?}", shown));
                }
                text
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n\nSteps:\n{}", self.goal, steps)
    }
}

/// The answer shown to the user, with the reasoning behind it
#[derive(Debug, Clone)]
pub struct FinalResponse {
    pub content: String,
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct RawFinalResponse {
    content: Option<String>,
    reasoning: Option<String>,
}

impl FinalResponse {
    pub fn parse(response: &str) -> Result<Self, ParseError> {
        let raw: RawFinalResponse = parse_structured(response)?;

        Ok(Self {
            content: raw
                .content
                .ok_or_else(|| ParseError::MissingField("content".to_string()))?,
            reasoning: raw
                .reasoning
                .ok_or_else(|| ParseError::MissingField("reasoning".to_string()))?,
        })
    }
}
