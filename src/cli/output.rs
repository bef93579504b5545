//! Output formatting for multiple formats
//!
//! This module provides formatters for different output formats including JSON, YAML,
//! and human-readable text. Each formatter implements consistent styling and structure.
//!
//! # Example
//!
//! ```ignore
//! use bitext_agent::agent::Answer;
//! use bitext_agent::cli::output::{OutputFormat, OutputFormatter};
//!
//! let answer = Answer { /* ... */ };
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_answer(&answer, false)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde_json;
use serde_yaml;
use std::collections::HashMap;

use crate::agent::Answer;
use crate::config::AgentConfig;
use crate::llm::ToolDefinition;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for agent results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an agent answer, optionally including its reasoning
    pub fn format_answer(&self, answer: &Answer, show_reasoning: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_answer_json(answer, show_reasoning),
            OutputFormat::Yaml => self.format_answer_yaml(answer, show_reasoning),
            OutputFormat::Human => self.format_answer_human(answer, show_reasoning),
        }
    }

    /// Formats the tool listing
    pub fn format_tools(
        &self,
        documentation: &str,
        definitions: &[ToolDefinition],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(definitions)
                .context("Failed to serialize tool definitions to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(definitions)
                .context("Failed to serialize tool definitions to YAML"),
            OutputFormat::Human => Ok(self.format_tools_human(documentation, definitions)),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &AgentConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let config_map = config.to_display_map();
                serde_json::to_string_pretty(&config_map)
                    .context("Failed to serialize config to JSON")
            }
            OutputFormat::Yaml => {
                let config_map = config.to_display_map();
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(self.format_config_human(config)),
        }
    }

    /// Formats health check results
    pub fn format_health(&self, health_results: &HashMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(health_results)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(health_results)
                .context("Failed to serialize health status to YAML"),
            OutputFormat::Human => Ok(self.format_health_human(health_results)),
        }
    }

    // JSON formatting methods

    fn format_answer_json(&self, answer: &Answer, show_reasoning: bool) -> Result<String> {
        let output = self.answer_value(answer, show_reasoning);
        serde_json::to_string_pretty(&output).context("Failed to serialize answer to JSON")
    }

    // YAML formatting methods

    fn format_answer_yaml(&self, answer: &Answer, show_reasoning: bool) -> Result<String> {
        let output = self.answer_value(answer, show_reasoning);
        serde_yaml::to_string(&output).context("Failed to serialize answer to YAML")
    }

    fn answer_value(&self, answer: &Answer, show_reasoning: bool) -> serde_json::Value {
        if show_reasoning {
            serde_json::json!({
                "answer": answer.content,
                "reasoning": answer.reasoning,
            })
        } else {
            serde_json::json!({ "answer": answer.content })
        }
    }

    // Human-readable formatting methods

    fn format_answer_human(&self, answer: &Answer, show_reasoning: bool) -> Result<String> {
        let mut output = String::new();
        output.push_str(&answer.content);
        output.push('\n');

        if show_reasoning && !answer.reasoning.is_empty() {
            output.push_str("\nReasoning: ");
            output.push_str(&answer.reasoning);
            output.push('\n');
        }

        Ok(output)
    }

    fn format_tools_human(&self, documentation: &str, definitions: &[ToolDefinition]) -> String {
        let mut output = String::new();

        output.push_str("Registered Tools\n");
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");

        output.push_str(documentation);
        if !documentation.ends_with('\n') {
            output.push('\n');
        }

        output.push_str(&format!("\n{} tools registered\n", definitions.len()));

        output
    }

    fn format_config_human(&self, config: &AgentConfig) -> String {
        let mut output = String::new();

        output.push_str("bitext-agent Configuration\n");
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");

        let config_map = config.to_display_map();

        output.push_str("Chat Backend:\n");
        if let Some(provider) = config_map.get("provider") {
            output.push_str(&format!("  Provider: {}\n", provider));
        }
        if let Some(model) = config_map.get("model") {
            output.push_str(&format!("  Model: {}\n", model));
        }
        if let Some(timeout) = config_map.get("request_timeout_secs") {
            output.push_str(&format!("  Timeout: {}s\n", timeout));
        }

        output.push_str("\nAgent Loop:\n");
        if let Some(mode) = config_map.get("mode") {
            output.push_str(&format!("  Mode: {}\n", mode));
        }
        if let Some(iterations) = config_map.get("max_iterations") {
            output.push_str(&format!("  Max Iterations: {}\n", iterations));
        }

        output.push_str("\nDataset:\n");
        if let Some(path) = config_map.get("dataset_path") {
            output.push_str(&format!("  Path: {}\n", path));
        }

        output.push_str("\nEmbeddings:\n");
        if let Some(url) = config_map.get("embeddings_url") {
            output.push_str(&format!("  URL: {}\n", url));
        }
        if let Some(model) = config_map.get("embeddings_model") {
            output.push_str(&format!("  Model: {}\n", model));
        }
        if let Some(dimensions) = config_map.get("embeddings_dimensions") {
            output.push_str(&format!("  Dimensions: {}\n", dimensions));
        }

        output.push_str("\nCache:\n");
        if let Some(enabled) = config_map.get("cache_enabled") {
            output.push_str(&format!("  Enabled: {}\n", enabled));
        }

        output
    }

    fn format_health_human(&self, health_results: &HashMap<String, HealthStatus>) -> String {
        let mut output = String::new();

        output.push_str("Agent Health Status\n");
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");

        // Sort components for consistent output
        let mut components: Vec<_> = health_results.keys().collect();
        components.sort();

        for component in components {
            let status = &health_results[component];
            let status_symbol = if status.available {
                "\u{2713}"
            } else {
                "\u{2717}"
            };

            output.push_str(&format!("{} {}\n", status_symbol, component));
            output.push_str(&format!(
                "  Status: {}\n",
                if status.available {
                    "Available"
                } else {
                    "Unavailable"
                }
            ));
            output.push_str(&format!("  Message: {}\n", status.message));

            if let Some(ref details) = status.details {
                output.push_str(&format!("  Details: {}\n", details));
            }
            output.push('\n');
        }

        output
    }
}

/// Health status for an agent component
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    /// Whether the component is available
    pub available: bool,
    /// Status message
    pub message: String,
    /// Optional additional details
    pub details: Option<String>,
}

impl HealthStatus {
    /// Creates a new health status indicating availability
    pub fn available(message: String) -> Self {
        Self {
            available: true,
            message,
            details: None,
        }
    }

    /// Creates a new health status indicating unavailability
    pub fn unavailable(message: String) -> Self {
        Self {
            available: false,
            message,
            details: None,
        }
    }

    /// Adds additional details to the health status
    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}
