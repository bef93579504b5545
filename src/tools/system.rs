use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::ToolCache;
use super::registry::ToolRegistry;
use crate::dataset::DatasetStore;
use crate::embedding::Embedder;
use crate::llm::ToolDefinition;

/// Minimum jaro-winkler score before a tool name is suggested in logs
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Dispatches tool calls from the LLM and reports every failure as data.
///
/// The LLM can recover from a bad call only if it sees what went wrong, so
/// `execute` never returns `Err`. Unknown tools, missing parameters, and
/// execution failures all come back as JSON objects with an `error` field.
pub struct ToolSystem {
    registry: ToolRegistry,
    cache: ToolCache,
    cache_enabled: bool,
}

impl ToolSystem {
    pub fn new(store: Arc<DatasetStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_cache_enabled(store, embedder, true)
    }

    /// Like `new`, but with session caching switched off when `enabled` is
    /// false. Tools still declare `cacheable()`; this overrides them all.
    pub fn with_cache_enabled(
        store: Arc<DatasetStore>,
        embedder: Arc<dyn Embedder>,
        enabled: bool,
    ) -> Self {
        Self {
            registry: ToolRegistry::new(store, embedder),
            cache: ToolCache::new(),
            cache_enabled: enabled,
        }
    }

    /// Execute a tool and return structured JSON result
    pub async fn execute(&self, tool_name: &str, arguments: Value) -> Value {
        let arguments = normalize_categories(arguments);
        info!(tool = tool_name, args = ?arguments, "Executing tool");

        let Some(tool) = self.registry.get_tool(tool_name) else {
            warn!(tool = tool_name, "Unknown tool requested");
            if let Some(closest) = self.closest_tool_name(tool_name) {
                debug!(tool = tool_name, closest = %closest, "Closest matching tool name");
            }
            return json!({
                "error": format!("Unknown tool: {}", tool_name),
                "available_tools": self.registry.tool_names(),
            });
        };

        let schema = tool.schema();
        let required = required_parameters(&schema);
        let missing = missing_required(&required, &arguments);
        if !missing.is_empty() {
            warn!(tool = tool_name, missing = ?missing, "Tool call missing required parameters");
            let provided: Vec<String> = arguments
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default();
            return json!({
                "error": format!("Missing required parameters: {}", missing.join(", ")),
                "required_parameters": required,
                "provided_parameters": provided,
            });
        }

        if self.cache_enabled && tool.cacheable() {
            if let Some(cached) = self.cache.get(tool_name, &arguments) {
                debug!(tool = tool_name, "Tool result found in cache");
                return cached;
            }
        }

        match tool.execute(arguments.clone()).await {
            Ok(output) => {
                let output_preview = serde_json::to_string(&output).unwrap_or_default();
                let preview_len = output_preview.len().min(200);
                info!(tool = tool_name, "Tool execution completed");
                debug!(
                    tool = tool_name,
                    output_preview = &output_preview[..preview_len],
                    "Tool output preview"
                );

                if self.cache_enabled && tool.cacheable() {
                    self.cache.insert(tool_name, &arguments, output.clone());
                }
                output
            }
            Err(e) => {
                warn!(tool = tool_name, error = %e, "Tool execution failed");
                json!({
                    "error": format!("{:#}", e),
                    "tool": tool_name,
                    "args": arguments,
                })
            }
        }
    }

    fn closest_tool_name(&self, requested: &str) -> Option<String> {
        self.registry
            .tool_names()
            .into_iter()
            .map(|name| (name, strsim::jaro_winkler(requested, name)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name.to_string())
    }

    pub fn as_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry.as_tool_definitions()
    }

    pub fn documentation(&self) -> String {
        self.registry.documentation()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.tool_names()
    }

    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

/// Upper-cases `category` values so they match the dataset's enum casing.
fn normalize_categories(mut arguments: Value) -> Value {
    if let Some(map) = arguments.as_object_mut() {
        uppercase_category(map);
        for key in ["filter", "filters"] {
            if let Some(inner) = map.get_mut(key).and_then(|v| v.as_object_mut()) {
                uppercase_category(inner);
            }
        }
    }
    arguments
}

fn uppercase_category(map: &mut Map<String, Value>) {
    let Some(value) = map.get_mut("category") else {
        return;
    };
    match value {
        Value::String(s) => *s = s.to_uppercase(),
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    *s = s.to_uppercase();
                }
            }
        }
        _ => {}
    }
}

fn required_parameters(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the required parameter names the arguments fail to provide.
fn missing_required(required: &[String], arguments: &Value) -> Vec<String> {
    required
        .iter()
        .filter(|name| {
            arguments
                .get(name.as_str())
                .map(|value| value.is_null())
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}
