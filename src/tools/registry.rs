//! Tool registry
//!
//! Maintains a registry of all available tools and provides them to the LLM.

use std::sync::Arc;

use super::implementations::*;
use super::trait_def::Tool;
use crate::dataset::DatasetStore;
use crate::embedding::Embedder;
use crate::llm::ToolDefinition;

/// Registry of all available tools
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new registry with all standard tools over the given dataset
    pub fn new(store: Arc<DatasetStore>, embedder: Arc<dyn Embedder>) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(DatasetInfoTool::new(Arc::clone(&store))),
            Arc::new(DataSlicerTool::new(Arc::clone(&store))),
            Arc::new(AggregatorTool::new(Arc::clone(&store))),
            Arc::new(ExactSearchTool::new(Arc::clone(&store))),
            Arc::new(SemanticSearchTool::new(
                Arc::clone(&store),
                Arc::clone(&embedder),
            )),
            Arc::new(FindCommonQuestionsTool::new(store, embedder)),
            Arc::new(CalculatorTool),
        ];

        Self { tools }
    }

    /// Get all tools as ToolDefinition for LLMClient trait
    pub fn as_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.schema(),
            })
            .collect()
    }

    /// Render a plain-text summary of every tool for the system prompt
    pub fn documentation(&self) -> String {
        let mut docs = Vec::new();
        for tool in &self.tools {
            let mut doc = format!("- {}: {}", tool.name(), tool.description());
            let schema = tool.schema();

            let mut param_docs = Vec::new();
            if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
                for (param_name, param_info) in properties {
                    let description = param_info
                        .get("description")
                        .and_then(|v| v.as_str())
                        .unwrap_or("");
                    let param_type = match param_info.get("type") {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(serde_json::Value::Array(types)) => types
                            .iter()
                            .filter_map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                        _ => String::new(),
                    };
                    param_docs.push(format!("  - {} ({}): {}", param_name, param_type, description));
                }
            }
            if !param_docs.is_empty() {
                doc.push_str("\n  Parameters:\n");
                doc.push_str(&param_docs.join("\n"));
            }
            docs.push(doc);
        }
        docs.join("\n")
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
    }

    /// Get all registered tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
