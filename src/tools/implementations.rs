use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::clustering::{kmeans, squared_distance};
use super::expr;
use super::trait_def::Tool;
use crate::dataset::{Column, DatasetStore, SupportRecord};
use crate::embedding::{cosine_similarity, Embedder};

/// Hard cap on rows returned to the LLM from any row-producing tool
const MAX_ROWS: usize = 10;
const DEFAULT_SEARCH_RESULTS: usize = 5;
const DEFAULT_PATTERN_COUNT: usize = 10;
const DEFAULT_AGGREGATOR_LIMIT: usize = 20;
const MAX_PATTERN_EXAMPLES: usize = 3;
const COMMON_WORD_COUNT: usize = 5;
const CLUSTER_SEED: u64 = 0;

fn rows_json(records: &[&SupportRecord], limit: usize) -> Result<Value> {
    let rows: Vec<Value> = records
        .iter()
        .take(limit)
        .map(|r| serde_json::to_value(r))
        .collect::<Result<_, _>>()?;
    Ok(Value::Array(rows))
}

fn matches_filter(record: &SupportRecord, column: Column, value: &Value) -> bool {
    let field = record.field(column);
    match value {
        Value::Array(options) => options.iter().any(|v| v.as_str() == Some(field)),
        Value::String(s) => field == s,
        _ => false,
    }
}

/// Filters records by column-value pairs; values may be scalars or arrays.
fn apply_filter<'a>(
    records: &'a [SupportRecord],
    filter: &Map<String, Value>,
) -> Result<Vec<&'a SupportRecord>> {
    let mut conditions = Vec::new();
    let mut invalid = Vec::new();
    for (name, value) in filter {
        match Column::from_name(name) {
            Ok(column) => conditions.push((column, value)),
            Err(_) => invalid.push(name.as_str()),
        }
    }
    if !invalid.is_empty() {
        return Err(anyhow!(
            "Invalid filter keys: {}. Available columns: {}",
            invalid.join(", "),
            Column::name_list()
        ));
    }

    Ok(records
        .iter()
        .filter(|r| conditions.iter().all(|(c, v)| matches_filter(r, *c, v)))
        .collect())
}

/// Parses a string-or-array-of-strings column argument.
fn parse_columns(value: &Value, argument: &str) -> Result<Vec<Column>> {
    let names: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| anyhow!("{} entries must be strings", argument))
            })
            .collect::<Result<_>>()?,
        _ => {
            return Err(anyhow!(
                "{} must be a string or an array of strings",
                argument
            ))
        }
    };

    let mut columns = Vec::new();
    let mut invalid = Vec::new();
    for name in names {
        match Column::from_name(name) {
            Ok(column) => columns.push(column),
            Err(_) => invalid.push(name),
        }
    }
    if !invalid.is_empty() {
        return Err(anyhow!(
            "Invalid {} columns: {}. Available columns: {}",
            argument,
            invalid.join(", "),
            Column::name_list()
        ));
    }

    Ok(columns)
}

fn length_stats(lengths: &mut [usize]) -> Value {
    if lengths.is_empty() {
        return json!({"mean": 0.0, "median": 0.0, "min": 0, "max": 0});
    }

    lengths.sort_unstable();
    let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let mid = lengths.len() / 2;
    let median = if lengths.len() % 2 == 1 {
        lengths[mid] as f64
    } else {
        (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
    };

    json!({
        "mean": mean,
        "median": median,
        "min": lengths[0],
        "max": lengths[lengths.len() - 1],
    })
}

fn distribution(records: &[SupportRecord], column: Column) -> (usize, Value) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.field(column)).or_insert(0) += 1;
    }
    let total = counts.len();
    let map: Map<String, Value> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), json!(count)))
        .collect();
    (total, Value::Object(map))
}

fn text_stats(records: &[&SupportRecord], column: Column) -> Value {
    if records.is_empty() {
        return json!({"avg_length": 0.0, "word_count": 0.0, "common_words": {}});
    }

    let mut char_total = 0usize;
    let mut word_total = 0usize;
    let mut word_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let text = record.field(column);
        char_total += text.chars().count();
        for word in text.split_whitespace() {
            word_total += 1;
            *word_counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = word_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let common_words: Map<String, Value> = ranked
        .into_iter()
        .take(COMMON_WORD_COUNT)
        .map(|(word, count)| (word.to_string(), json!(count)))
        .collect();

    json!({
        "avg_length": char_total as f64 / records.len() as f64,
        "word_count": word_total as f64 / records.len() as f64,
        "common_words": common_words,
    })
}

/// Builds the dataset overview returned by `dataset_info` and embedded in
/// the agent's system prompt.
pub(crate) fn dataset_overview(store: &DatasetStore) -> Value {
    let records = store.records();

    let mut instruction_lengths: Vec<usize> = records
        .iter()
        .map(|r| r.instruction.chars().count())
        .collect();
    let mut response_lengths: Vec<usize> =
        records.iter().map(|r| r.response.chars().count()).collect();

    let (category_total, category_dist) = distribution(records, Column::Category);
    let (intent_total, intent_dist) = distribution(records, Column::Intent);
    let (flags_total, flags_dist) = distribution(records, Column::Flags);

    json!({
        "dataset": {
            "total_entries": store.len(),
            "columns": store.columns(),
            "description": {
                "purpose": "A dataset for analyzing customer service interaction patterns, understanding query distributions, and studying the relationships between customer intents, categories, and response characteristics",
                "content": "Contains customer queries, agent responses, and metadata including categories, intents, and flags",
                "use_cases": [
                    "Analyzing customer service interaction patterns",
                    "Understanding query distributions and common scenarios",
                    "Studying relationships between intents and categories",
                    "Evaluating response characteristics and effectiveness"
                ]
            }
        },
        "instruction": {
            "length": length_stats(&mut instruction_lengths)
        },
        "response": {
            "length": length_stats(&mut response_lengths)
        },
        "category": {
            "total": category_total,
            "distribution": category_dist
        },
        "intent": {
            "total": intent_total,
            "distribution": intent_dist
        },
        "flags": {
            "total": flags_total,
            "distribution": flags_dist
        }
    })
}

pub struct DatasetInfoTool {
    store: Arc<DatasetStore>,
}

impl DatasetInfoTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DatasetInfoTool {
    fn name(&self) -> &'static str {
        "dataset_info"
    }

    fn description(&self) -> &'static str {
        "Get comprehensive information about the dataset including its purpose, content, use cases, \
         and key features. Also includes columns, categories, intents, their distributions, and \
         basic statistics. Use this to understand the dataset structure and content before \
         performing specific analyses."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(dataset_overview(&self.store))
    }
}

pub struct DataSlicerTool {
    store: Arc<DatasetStore>,
}

impl DataSlicerTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DataSlicerTool {
    fn name(&self) -> &'static str {
        "data_slicer"
    }

    fn description(&self) -> &'static str {
        "Get a slice of the dataset based on filtering, grouping, sorting, and sampling criteria. \
         Use this tool when you need to extract specific portions of the data based on various conditions. \
         Supports filtering by column values, grouping by columns, sorting, and sampling. \
         Example use cases: getting all ACCOUNT category entries, grouping by intent and sorting by count, \
         or getting a random sample of 100 rows."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "object",
                    "description": "Optional dictionary of column-value pairs to filter the data. Values can be single values or lists for multiple matches. Example: {'category': 'ACCOUNT'} or {'intent': ['cancel_order', 'track_order']}"
                },
                "group_by": {
                    "type": ["string", "array"],
                    "description": "Column(s) to group by. Can be a single column name or a list of column names. Example: 'category' or ['category', 'intent']",
                    "items": {
                        "type": "string"
                    }
                },
                "sort_by": {
                    "type": ["string", "object"],
                    "description": "Column to sort by. Can be a column name or a dict with column name and ascending flag. Example: 'category' or {'category': false} for descending sort"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of rows to return"
                },
                "random_sample": {
                    "type": "boolean",
                    "description": "If true, return random rows instead of first N rows when limit is specified",
                    "default": false
                }
            }
        })
    }

    fn cacheable(&self) -> bool {
        // Random sampling makes repeated calls legitimately differ
        false
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let limit = args.get("limit").and_then(|v| v.as_u64()).map(|v| v as usize);
        let random_sample = args
            .get("random_sample")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        debug!(limit, random_sample, "data_slicer parameters");

        let mut rows: Vec<&SupportRecord> = match args.get("filter") {
            Some(Value::Object(filter)) => apply_filter(self.store.records(), filter)?,
            Some(Value::Null) | None => self.store.records().iter().collect(),
            Some(_) => return Err(anyhow!("filter must be an object of column-value pairs")),
        };

        if let Some(group_by) = args.get("group_by").filter(|v| !v.is_null()) {
            let group_columns = parse_columns(group_by, "group_by")?;
            rows.sort_by(|a, b| {
                group_columns
                    .iter()
                    .map(|c| a.field(*c))
                    .cmp(group_columns.iter().map(|c| b.field(*c)))
            });
        }

        if let Some(sort_by) = args.get("sort_by").filter(|v| !v.is_null()) {
            let (name, ascending) = match sort_by {
                Value::String(name) => (name.as_str(), true),
                Value::Object(map) => {
                    let (name, direction) = map
                        .iter()
                        .next()
                        .ok_or_else(|| anyhow!("sort_by object must contain a column name"))?;
                    let ascending = direction
                        .as_bool()
                        .ok_or_else(|| anyhow!("sort_by direction must be a boolean"))?;
                    (name.as_str(), ascending)
                }
                _ => return Err(anyhow!("sort_by must be a string or an object")),
            };
            let column = Column::from_name(name).map_err(|_| {
                anyhow!(
                    "Invalid sort_by column: {}. Available columns: {}",
                    name,
                    Column::name_list()
                )
            })?;

            if ascending {
                rows.sort_by(|a, b| a.field(column).cmp(b.field(column)));
            } else {
                rows.sort_by(|a, b| b.field(column).cmp(a.field(column)));
            }
        }

        if let Some(limit) = limit {
            if random_sample {
                let mut rng = rand::thread_rng();
                rows = rows
                    .choose_multiple(&mut rng, limit.min(rows.len()))
                    .copied()
                    .collect();
            } else {
                rows.truncate(limit);
            }
        }

        debug!(rows = rows.len(), "data_slicer completed");

        rows_json(&rows, MAX_ROWS)
    }
}

pub struct AggregatorTool {
    store: Arc<DatasetStore>,
}

impl AggregatorTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AggregatorTool {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    fn description(&self) -> &'static str {
        "Perform flexible aggregations on the dataset. \
         Use this tool when you need to analyze data by grouping it and calculating various metrics. \
         Supports counting rows, calculating percentages, counting unique values, and analyzing text statistics. \
         Example use cases: counting entries by category, calculating percentage distribution of intents, \
         or analyzing text length patterns in customer messages."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "group_by": {
                    "type": ["string", "array"],
                    "description": "Column(s) to group by. Can be a single column name or a list of column names. Example: 'category' or ['category', 'intent']",
                    "items": {
                        "type": "string"
                    }
                },
                "metrics": {
                    "type": "array",
                    "description": "List of metrics to calculate. Available metrics: 'count', 'percentage', 'unique', 'text_stats'",
                    "items": {
                        "type": "string",
                        "enum": ["count", "percentage", "unique", "text_stats"]
                    },
                    "default": ["count"]
                },
                "filters": {
                    "type": "object",
                    "description": "Optional filters to apply. Example: {'category': 'ACCOUNT'}"
                },
                "sort_by": {
                    "type": "string",
                    "description": "Column to sort results by"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return",
                    "default": 10
                }
            },
            "required": ["group_by"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let group_by = args
            .get("group_by")
            .filter(|v| !v.is_null())
            .ok_or_else(|| anyhow!("group_by is required"))?;
        let group_columns = parse_columns(group_by, "group_by")?;

        let metrics: Vec<String> = match args.get("metrics") {
            None | Some(Value::Null) => vec!["count".to_string()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(_) => return Err(anyhow!("metrics must be an array of metric names")),
        };

        let limit = args
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_AGGREGATOR_LIMIT);

        debug!(?group_columns, ?metrics, limit, "aggregator parameters");

        let mut rows: Vec<&SupportRecord> = self.store.records().iter().collect();
        if let Some(filters) = args.get("filters") {
            match filters {
                Value::Object(map) => {
                    for (name, value) in map {
                        let column = Column::from_name(name)?;
                        rows.retain(|r| value.as_str() == Some(r.field(column)));
                    }
                }
                Value::Null => {}
                _ => return Err(anyhow!("filters must be an object of column-value pairs")),
            }
        }

        let total_rows = rows.len();

        let mut groups: BTreeMap<Vec<&str>, Vec<&SupportRecord>> = BTreeMap::new();
        for record in rows {
            let key: Vec<&str> = group_columns.iter().map(|c| record.field(*c)).collect();
            groups.entry(key).or_default().push(record);
        }

        let wants = |metric: &str| metrics.iter().any(|m| m == metric);

        let mut results = Vec::new();
        for (key, members) in &groups {
            let mut group = Map::new();
            for (column, value) in group_columns.iter().zip(key) {
                group.insert(column.as_str().to_string(), json!(value));
            }

            let mut metric_values = Map::new();
            if wants("count") {
                metric_values.insert("count".to_string(), json!(members.len()));
            }
            if wants("percentage") {
                let percentage = if total_rows == 0 {
                    0.0
                } else {
                    members.len() as f64 / total_rows as f64 * 100.0
                };
                metric_values.insert("percentage".to_string(), json!(percentage));
            }
            if wants("unique") {
                for column in Column::ALL {
                    if group_columns.contains(&column) {
                        continue;
                    }
                    let mut values: Vec<&str> =
                        members.iter().map(|r| r.field(column)).collect();
                    values.sort_unstable();
                    values.dedup();
                    metric_values
                        .insert(format!("unique_{}", column.as_str()), json!(values.len()));
                }
            }
            if wants("text_stats") {
                for column in [Column::Instruction, Column::Response] {
                    metric_values.insert(
                        format!("{}_stats", column.as_str()),
                        text_stats(members, column),
                    );
                }
            }

            results.push(json!({"group": group, "metrics": metric_values}));
        }

        if let Some(sort_metric) = args.get("sort_by").and_then(|v| v.as_str()) {
            results.sort_by(|a, b| {
                let av = a["metrics"]
                    .get(sort_metric)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                let bv = b["metrics"]
                    .get(sort_metric)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        results.truncate(limit);

        debug!(groups = results.len(), total_rows, "aggregator completed");

        Ok(json!({
            "results": results,
            "metadata": {
                "total_groups": results.len(),
                "total_rows": total_rows,
                "group_by": group_columns.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                "metrics": metrics,
            }
        }))
    }
}

pub struct ExactSearchTool {
    store: Arc<DatasetStore>,
}

impl ExactSearchTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ExactSearchTool {
    fn name(&self) -> &'static str {
        "exact_search"
    }

    fn description(&self) -> &'static str {
        "Search for exact text matches in specified column(s). Case-insensitive matching. \
         Use this tool when you need to find entries containing specific text or phrases. \
         Unlike semantic search, this looks for literal text matches rather than conceptual similarity. \
         You can search in any column of the dataset, or omit the column parameter to search in both 'instruction' and 'response' columns. \
         Example use cases: finding specific keywords, phrases, or exact text patterns in any column of the data."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to search for"
                },
                "column": {
                    "type": "string",
                    "description": "Column to search in (any column name from the dataset, or omit to search both 'instruction' and 'response')"
                },
                "k": {
                    "type": "integer",
                    "description": "Maximum number of results to return",
                    "default": 5
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("text is required"))?;
        let k = args
            .get("k")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_SEARCH_RESULTS);
        let column = match args.get("column").and_then(|v| v.as_str()) {
            Some(name) => Some(Column::from_name(name).map_err(|_| {
                anyhow!(
                    "Column '{}' not found in dataset. Available columns: {}",
                    name,
                    Column::name_list()
                )
            })?),
            None => None,
        };

        debug!(text, ?column, k, "exact_search parameters");

        let needle = text.to_lowercase();
        let matches: Vec<&SupportRecord> = self
            .store
            .records()
            .iter()
            .filter(|r| match column {
                Some(col) => r.field(col).to_lowercase().contains(&needle),
                None => {
                    r.instruction.to_lowercase().contains(&needle)
                        || r.response.to_lowercase().contains(&needle)
                }
            })
            .take(k)
            .collect();

        debug!(matches = matches.len(), "exact_search completed");

        rows_json(&matches, MAX_ROWS)
    }
}

pub struct SemanticSearchTool {
    store: Arc<DatasetStore>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticSearchTool {
    pub fn new(store: Arc<DatasetStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }
}

#[async_trait]
impl Tool for SemanticSearchTool {
    fn name(&self) -> &'static str {
        "semantic_search"
    }

    fn description(&self) -> &'static str {
        "Perform semantic search on the dataset using sentence embeddings. \
         This tool finds the most semantically similar entries to the given query text. \
         Use this when you need to find entries that are conceptually similar to a given text, \
         even if they don't contain the exact same words. \
         Example use cases: finding similar customer questions, related support requests, \
         or semantically similar responses."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The query text to search for semantically similar entries"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of most similar results to return",
                    "default": 5
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("text is required"))?;
        let k = args
            .get("k")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_SEARCH_RESULTS);

        debug!(text, k, "semantic_search parameters");

        let query = self.embedder.embed(text).await?;
        let embeddings = self.store.record_embeddings(self.embedder.as_ref()).await?;

        let mut scored: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(&query, e)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let records = self.store.records();
        let top: Vec<&SupportRecord> = scored.iter().take(k).map(|(i, _)| &records[*i]).collect();

        debug!(matches = top.len(), "semantic_search completed");

        rows_json(&top, MAX_ROWS)
    }
}

pub struct FindCommonQuestionsTool {
    store: Arc<DatasetStore>,
    embedder: Arc<dyn Embedder>,
}

impl FindCommonQuestionsTool {
    pub fn new(store: Arc<DatasetStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }
}

#[async_trait]
impl Tool for FindCommonQuestionsTool {
    fn name(&self) -> &'static str {
        "find_common_questions"
    }

    fn description(&self) -> &'static str {
        "Analyzes customer messages to find common patterns and group similar inquiries together. \
         This tool helps understand how customers typically phrase their requests and what they need help with most often. \
         It uses machine learning to identify patterns in customer messages and provides examples of how customers ask similar questions. \
         Use this when you want to understand common customer needs or improve response templates. \
         Note: This tool may take a few minutes to run as it performs complex clustering analysis on the data."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "object",
                    "description": "Optional dictionary of column-value pairs to filter the data (e.g., {'category': 'ACCOUNT', 'intent': 'cancel_order'})"
                },
                "text_field": {
                    "type": "string",
                    "description": "Which part to analyze - customer questions ('instruction') or agent responses ('response')",
                    "default": "instruction"
                },
                "n": {
                    "type": "integer",
                    "description": "How many common patterns to show",
                    "default": 10
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let text_field = args
            .get("text_field")
            .and_then(|v| v.as_str())
            .unwrap_or("instruction");
        let n = args
            .get("n")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_PATTERN_COUNT);
        if n == 0 {
            return Err(anyhow!("n must be at least 1"));
        }

        debug!(text_field, n, "find_common_questions parameters");

        let rows: Vec<&SupportRecord> = match args.get("filter") {
            Some(Value::Object(filter)) => apply_filter(self.store.records(), filter)?,
            Some(Value::Null) | None => self.store.records().iter().collect(),
            Some(_) => return Err(anyhow!("filter must be an object of column-value pairs")),
        };

        // Unknown field names fall back to the first text column
        let column = Column::from_name(text_field).unwrap_or(Column::Instruction);
        let available_fields = self.store.columns();

        let texts: Vec<String> = rows.iter().map(|r| r.field(column).to_string()).collect();

        if texts.is_empty() {
            return Ok(json!({
                "patterns": [],
                "total_entries": 0,
                "available_fields": available_fields
            }));
        }

        let n_clusters = n.min(texts.len());
        if n_clusters == 1 {
            return Ok(json!({
                "patterns": [{
                    "pattern": texts[0],
                    "count": 1,
                    "examples": [texts[0]]
                }],
                "total_entries": 1,
                "available_fields": available_fields
            }));
        }

        let embeddings = self.embedder.embed_batch(&texts).await?;
        let clustering = kmeans(&embeddings, n_clusters, CLUSTER_SEED);

        let mut rng = StdRng::seed_from_u64(CLUSTER_SEED);
        let mut patterns = Vec::new();
        for cluster in 0..clustering.centroids.len() {
            let members = clustering.members(cluster);
            if members.is_empty() {
                continue;
            }

            let centroid = &clustering.centroids[cluster];
            let closest = members
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    let da = squared_distance(&embeddings[a], centroid);
                    let db = squared_distance(&embeddings[b], centroid);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(members[0]);

            let examples: Vec<&str> = members
                .choose_multiple(&mut rng, MAX_PATTERN_EXAMPLES.min(members.len()))
                .map(|&i| texts[i].as_str())
                .collect();

            patterns.push(json!({
                "pattern": texts[closest],
                "count": members.len(),
                "examples": examples,
            }));
        }

        patterns.sort_by(|a, b| b["count"].as_u64().cmp(&a["count"].as_u64()));
        patterns.truncate(n);

        debug!(patterns = patterns.len(), analyzed = rows.len(), "find_common_questions completed");

        Ok(json!({
            "patterns": patterns,
            "total_entries": rows.len(),
            "available_fields": available_fields
        }))
    }
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Evaluate mathematical expressions. Supports basic arithmetic, trigonometric functions, \
         logarithms, and other common mathematical operations. \
         Use this tool when you need to perform mathematical calculations or when the user asks for numerical computations. \
         Always prefer using this tool over doing calculations yourself, even for simple arithmetic. \
         Provide the expression as a string (e.g., '2 + 2', 'sin(pi/2)', 'sqrt(16)')."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate. Examples: '2 + 2', 'sin(pi/2)', 'sqrt(16)', 'log(100)', '6095/100'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("expression is required"))?;

        debug!(expression, "calculator parameters");

        // Evaluation failures are part of the result, not dispatch errors
        match expr::evaluate(expression) {
            Ok(result) => Ok(json!({"result": result, "expression": expression})),
            Err(e) => Ok(json!({"error": e.to_string(), "expression": expression})),
        }
    }
}
