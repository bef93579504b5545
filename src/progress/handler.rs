//! Progress handler trait and events

/// Events emitted while the agent works on a question
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scope classification finished
    ScopeChecked { verdict: String, reasoning: String },

    /// Reactive thinking step decided
    ThinkingStep { reasoning: String, next_step: String },

    /// Plan strategy produced its outline
    PlanReady { goal: String, rendered: String },

    /// Plan strategy started executing a step
    PlanStepStarted {
        index: usize,
        total: usize,
        reasoning: String,
    },

    /// The LLM announced it is about to call tools
    ToolCallsPlanned { reasoning: String },

    /// A single tool execution started
    ToolCallStarted {
        tool_name: String,
        arguments: String,
    },

    /// A single tool execution finished
    ToolCallComplete { tool_name: String, summary: String },

    /// Final answer is ready
    AnswerReady { reasoning: String },
}

/// Trait for handling progress events during a question
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn handle(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn handle(&self, _event: &ProgressEvent) {
        // Intentionally empty
    }
}
