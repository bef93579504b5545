use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::{parse_structured, ParseError};

/// Whether a user question belongs to the dataset's territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeVerdict {
    InScope,
    OutOfScope,
}

impl fmt::Display for ScopeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeVerdict::InScope => write!(f, "in_scope"),
            ScopeVerdict::OutOfScope => write!(f, "out_of_scope"),
        }
    }
}

/// Parsed result of a scope classification
#[derive(Debug, Clone)]
pub struct ScopeCheck {
    pub verdict: ScopeVerdict,
    pub reasoning: String,
}

/// What the model actually returns; every field optional until validated
#[derive(Debug, Deserialize)]
struct RawScopeCheck {
    verdict: Option<ScopeVerdict>,
    reasoning: Option<String>,
}

impl ScopeCheck {
    pub fn parse(response: &str) -> Result<Self, ParseError> {
        let raw: RawScopeCheck = parse_structured(response)?;

        let verdict = raw
            .verdict
            .ok_or_else(|| ParseError::MissingField("verdict".to_string()))?;
        let reasoning = raw
            .reasoning
            .ok_or_else(|| ParseError::MissingField("reasoning".to_string()))?;

        Ok(Self { verdict, reasoning })
    }

    pub fn is_in_scope(&self) -> bool {
        self.verdict == ScopeVerdict::InScope
    }
}
