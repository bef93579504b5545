//! Structured output parsing helpers
//!
//! The agent asks the model for JSON in several places (scope checks,
//! thinking steps, plans, final responses). Models rarely return bare JSON
//! reliably: they wrap it in markdown fences or chat around it. This module
//! digs the JSON object out of whatever came back and deserializes it.

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Parse error: {0}")]
    Other(String),
}

/// Extracts a JSON object from an LLM response
///
/// Tries, in order: the whole trimmed response, a markdown code block,
/// and finally the outermost brace pair.
pub fn extract_json_block(response: &str) -> Result<String, ParseError> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed.to_string());
    }

    if trimmed.contains("```") {
        return extract_from_markdown_block(trimmed);
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if start < end {
                return Ok(trimmed[start..=end].to_string());
            }
        }
    }

    Err(ParseError::InvalidJson(
        "No JSON object found in response".to_string(),
    ))
}

fn extract_from_markdown_block(text: &str) -> Result<String, ParseError> {
    let re = Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").expect("valid regex");

    if let Some(captures) = re.captures(text) {
        if let Some(json_match) = captures.get(1) {
            let json = json_match.as_str().trim();
            if json.starts_with('{') && json.ends_with('}') {
                return Ok(json.to_string());
            }
        }
    }

    Err(ParseError::InvalidJson(
        "Could not extract JSON from markdown block".to_string(),
    ))
}

/// Extracts and deserializes a JSON object from an LLM response
pub fn parse_structured<T: DeserializeOwned>(response: &str) -> Result<T, ParseError> {
    debug!("Parsing structured response ({} chars)", response.len());

    let json_str = extract_json_block(response)?;

    serde_json::from_str(&json_str).map_err(|e| {
        warn!("JSON parse error: {}", e);
        ParseError::InvalidJson(format!(
            "{}: {}",
            e,
            json_str.chars().take(100).collect::<String>()
        ))
    })
}
