//! Record and column types for the customer support dataset

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single customer support exchange.
///
/// Mirrors one row of the Bitext customer support corpus: a customer
/// message (`instruction`), the agent's reply (`response`), and the
/// classification metadata attached to the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRecord {
    /// Customer message
    pub instruction: String,
    /// Agent response
    pub response: String,
    /// High-level category (upper case, e.g. "ACCOUNT")
    pub category: String,
    /// Fine-grained intent (snake case, e.g. "cancel_order")
    pub intent: String,
    /// Language-variation flags attached to the instruction
    pub flags: String,
}

impl SupportRecord {
    /// Returns the value of the given column for this record.
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Instruction => &self.instruction,
            Column::Response => &self.response,
            Column::Category => &self.category,
            Column::Intent => &self.intent,
            Column::Flags => &self.flags,
        }
    }
}

/// The columns of the dataset, used wherever a tool argument names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Instruction,
    Response,
    Category,
    Intent,
    Flags,
}

impl Column {
    /// All columns in display order.
    pub const ALL: [Column; 5] = [
        Column::Instruction,
        Column::Response,
        Column::Category,
        Column::Intent,
        Column::Flags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Instruction => "instruction",
            Column::Response => "response",
            Column::Category => "category",
            Column::Intent => "intent",
            Column::Flags => "flags",
        }
    }

    /// Resolves a column by name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, UnknownColumn> {
        match name.to_lowercase().as_str() {
            "instruction" => Ok(Column::Instruction),
            "response" => Ok(Column::Response),
            "category" => Ok(Column::Category),
            "intent" => Ok(Column::Intent),
            "flags" => Ok(Column::Flags),
            _ => Err(UnknownColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Comma-separated list of valid column names for error messages.
    pub fn name_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column name that does not exist in the dataset.
#[derive(Debug, Clone, Error)]
#[error("Unknown column: '{name}'. Available columns: {}", Column::name_list())]
pub struct UnknownColumn {
    pub name: String,
}

/// Errors raised while loading the dataset from disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Dataset contains no records")]
    Empty,
}
