//! Console progress handler
//!
//! Renders the agent's thinking trace to stderr so it never mixes with the
//! answer on stdout.

use super::{ProgressEvent, ProgressHandler};

/// Handler that prints progress events to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgressHandler;

impl ProgressHandler for ConsoleProgressHandler {
    fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ScopeChecked { verdict, reasoning } => {
                eprintln!("Scope check: {}", verdict);
                eprintln!("   {}", reasoning);
            }
            ProgressEvent::ThinkingStep {
                reasoning,
                next_step,
            } => {
                eprintln!("\n{}", reasoning);
                eprintln!("My next step should be: {}", next_step);
            }
            ProgressEvent::PlanReady { goal: _, rendered } => {
                eprintln!("\nThe plan:\n{}", rendered);
                eprintln!("\nExecuting the plan...");
            }
            ProgressEvent::PlanStepStarted {
                index,
                total,
                reasoning,
            } => {
                eprintln!("\nStep {}/{}: {}", index, total, reasoning);
            }
            ProgressEvent::ToolCallsPlanned { reasoning } => {
                eprintln!("\n{}", reasoning);
            }
            ProgressEvent::ToolCallStarted {
                tool_name,
                arguments,
            } => {
                eprintln!("   Executing tool: {} with args: {}", tool_name, arguments);
            }
            ProgressEvent::ToolCallComplete { tool_name, summary } => {
                eprintln!("   {} {}", tool_name, summary);
            }
            ProgressEvent::AnswerReady { reasoning } => {
                eprintln!("\n{}", reasoning);
            }
        }
    }
}
