//! Scope gate for incoming questions
//!
//! Every user message is classified before the agent works on it. Questions
//! the dataset cannot answer get a fixed refusal instead of a tool run.

mod checker;
mod types;

pub use checker::{ScopeChecker, ScopeError};
pub use types::{ScopeCheck, ScopeVerdict};
