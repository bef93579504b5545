//! Tool behavior tests through the dispatch layer
//!
//! Each tool is exercised the way the agent calls it: through
//! `ToolSystem::execute`, which layers argument validation, caching, and
//! error-as-data reporting over the implementations. The fixture dataset is
//! small enough to assert exact counts, orderings, and percentages.

use bitext_agent::dataset::{DatasetStore, SupportRecord};
use bitext_agent::embedding::MockEmbedder;
use bitext_agent::tools::ToolSystem;
use serde_json::json;
use std::sync::Arc;

fn record(instruction: &str, response: &str, category: &str, intent: &str) -> SupportRecord {
    SupportRecord {
        instruction: instruction.to_string(),
        response: response.to_string(),
        category: category.to_string(),
        intent: intent.to_string(),
        flags: "B".to_string(),
    }
}

/// Six conversations across three categories, with known overlaps
fn sample_records() -> Vec<SupportRecord> {
    vec![
        record(
            "I want to cancel order {{Order Number}}",
            "I understand you want to cancel your order",
            "ORDER",
            "cancel_order",
        ),
        record(
            "where is my package",
            "Let me track the shipment for you",
            "ORDER",
            "track_order",
        ),
        record(
            "track my order please",
            "Tracking information coming right up",
            "ORDER",
            "track_order",
        ),
        record(
            "I want my money back",
            "I can start the refund process right away",
            "REFUND",
            "get_refund",
        ),
        record(
            "where is my refund",
            "Checking the refund status for you",
            "REFUND",
            "track_refund",
        ),
        record(
            "please delete my account",
            "I can remove the account permanently",
            "ACCOUNT",
            "delete_account",
        ),
    ]
}

fn sample_system() -> ToolSystem {
    let store = Arc::new(DatasetStore::from_records(sample_records()));
    ToolSystem::new(store, Arc::new(MockEmbedder::new(8)))
}

#[tokio::test]
async fn test_dataset_info_reports_structure() {
    let system = sample_system();

    let result = system.execute("dataset_info", json!({})).await;

    assert_eq!(result["dataset"]["total_entries"], json!(6));
    assert_eq!(
        result["dataset"]["columns"],
        json!(["instruction", "response", "category", "intent", "flags"])
    );
    assert_eq!(result["category"]["total"], json!(3));
    assert_eq!(result["category"]["distribution"]["ORDER"], json!(3));
    assert_eq!(result["intent"]["distribution"]["track_order"], json!(2));
    assert!(result["instruction"]["length"]["mean"].is_number());
    assert!(result["response"]["length"]["max"].is_number());
}

#[tokio::test]
async fn test_exact_search_matches_case_insensitively() {
    let system = sample_system();

    let result = system
        .execute("exact_search", json!({"text": "CANCEL"}))
        .await;

    let rows = result.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["intent"], json!("cancel_order"));
}

#[tokio::test]
async fn test_exact_search_respects_column_restriction() {
    let system = sample_system();

    // "refund" appears in two responses but only one instruction
    let in_responses = system
        .execute("exact_search", json!({"text": "refund", "column": "response"}))
        .await;
    assert_eq!(in_responses.as_array().unwrap().len(), 2);

    let in_instructions = system
        .execute(
            "exact_search",
            json!({"text": "refund", "column": "instruction"}),
        )
        .await;
    let rows = in_instructions.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["intent"], json!("track_refund"));
}

#[tokio::test]
async fn test_exact_search_limits_results() {
    let system = sample_system();

    let result = system
        .execute("exact_search", json!({"text": "order", "k": 1}))
        .await;

    assert_eq!(result.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_exact_search_unknown_column_is_reported() {
    let system = sample_system();

    let result = system
        .execute("exact_search", json!({"text": "x", "column": "subject"}))
        .await;

    let error = result["error"].as_str().unwrap();
    assert!(error.contains("Column 'subject' not found"));
    assert!(error.contains("instruction, response, category, intent, flags"));
    assert_eq!(result["tool"], json!("exact_search"));
}

#[tokio::test]
async fn test_data_slicer_filters_and_sorts() {
    let system = sample_system();

    let result = system
        .execute(
            "data_slicer",
            json!({
                "filter": {"category": "ORDER"},
                "sort_by": {"intent": false},
                "limit": 2
            }),
        )
        .await;

    let rows = result.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // descending sort puts track_order ahead of cancel_order
    assert_eq!(rows[0]["intent"], json!("track_order"));
    assert_eq!(rows[1]["intent"], json!("track_order"));
}

#[tokio::test]
async fn test_data_slicer_accepts_multi_value_filters() {
    let system = sample_system();

    let result = system
        .execute(
            "data_slicer",
            json!({
                "filter": {"intent": ["get_refund", "delete_account"]},
                "group_by": "intent"
            }),
        )
        .await;

    let rows = result.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // grouping orders rows by the group column
    assert_eq!(rows[0]["intent"], json!("delete_account"));
    assert_eq!(rows[1]["intent"], json!("get_refund"));
}

#[tokio::test]
async fn test_data_slicer_rejects_unknown_filter_keys() {
    let system = sample_system();

    let result = system
        .execute("data_slicer", json!({"filter": {"mood": "angry"}}))
        .await;

    let error = result["error"].as_str().unwrap();
    assert!(error.contains("Invalid filter keys: mood"));
    assert!(error.contains("instruction, response, category, intent, flags"));
}

#[tokio::test]
async fn test_row_outputs_are_capped() {
    let records: Vec<SupportRecord> = (0..12)
        .map(|i| {
            record(
                &format!("question number {}", i),
                &format!("answer number {}", i),
                "ORDER",
                "track_order",
            )
        })
        .collect();
    let store = Arc::new(DatasetStore::from_records(records));
    let system = ToolSystem::new(store, Arc::new(MockEmbedder::new(8)));

    let result = system.execute("data_slicer", json!({})).await;

    // Row-producing tools never hand the model more than ten rows
    assert_eq!(result.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_aggregator_counts_and_percentages() {
    let system = sample_system();

    let result = system
        .execute(
            "aggregator",
            json!({"group_by": "category", "metrics": ["count", "percentage"]}),
        )
        .await;

    // Groups come back in lexicographic order: ACCOUNT, ORDER, REFUND
    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["group"]["category"], json!("ACCOUNT"));
    assert_eq!(results[0]["metrics"]["count"], json!(1));
    assert_eq!(results[1]["group"]["category"], json!("ORDER"));
    assert_eq!(results[1]["metrics"]["count"], json!(3));
    assert_eq!(results[1]["metrics"]["percentage"], json!(50.0));

    assert_eq!(result["metadata"]["total_groups"], json!(3));
    assert_eq!(result["metadata"]["total_rows"], json!(6));
    assert_eq!(result["metadata"]["group_by"], json!(["category"]));
}

#[tokio::test]
async fn test_aggregator_filters_then_sorts_by_metric() {
    let system = sample_system();

    let result = system
        .execute(
            "aggregator",
            json!({
                "group_by": "intent",
                "filters": {"category": "ORDER"},
                "sort_by": "count"
            }),
        )
        .await;

    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["group"]["intent"], json!("track_order"));
    assert_eq!(results[0]["metrics"]["count"], json!(2));
    assert_eq!(results[1]["group"]["intent"], json!("cancel_order"));

    // total_rows reflects the filtered slice, not the whole dataset
    assert_eq!(result["metadata"]["total_rows"], json!(3));
}

#[tokio::test]
async fn test_aggregator_unique_counts_exclude_group_columns() {
    let system = sample_system();

    let result = system
        .execute(
            "aggregator",
            json!({"group_by": "category", "metrics": ["unique"]}),
        )
        .await;

    let order_metrics = &result["results"][1]["metrics"];
    assert_eq!(order_metrics["unique_intent"], json!(2));
    assert_eq!(order_metrics["unique_instruction"], json!(3));
    // the grouped column itself is not double-counted
    assert!(order_metrics.get("unique_category").is_none());
}

#[tokio::test]
async fn test_semantic_search_returns_k_rows() {
    let system = sample_system();

    let result = system
        .execute(
            "semantic_search",
            json!({"text": "package tracking", "k": 3}),
        )
        .await;

    let rows = result.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert!(row["instruction"].is_string());
        assert!(row["category"].is_string());
    }
}

#[tokio::test]
async fn test_find_common_questions_clusters_instructions() {
    let system = sample_system();

    let result = system.execute("find_common_questions", json!({"n": 2})).await;

    let patterns = result["patterns"].as_array().unwrap();
    assert!(!patterns.is_empty());
    assert!(patterns.len() <= 2);

    // Every entry lands in exactly one pattern
    let total: u64 = patterns.iter().map(|p| p["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 6);
    for pattern in patterns {
        assert!(pattern["pattern"].is_string());
        assert!(!pattern["examples"].as_array().unwrap().is_empty());
    }

    assert_eq!(result["total_entries"], json!(6));
    assert_eq!(
        result["available_fields"],
        json!(["instruction", "response", "category", "intent", "flags"])
    );
}

#[tokio::test]
async fn test_find_common_questions_rejects_zero_patterns() {
    let system = sample_system();

    let result = system.execute("find_common_questions", json!({"n": 0})).await;

    let error = result["error"].as_str().unwrap();
    assert!(error.contains("n must be at least 1"));
}

#[tokio::test]
async fn test_find_common_questions_with_empty_slice() {
    let system = sample_system();

    // No ORDER row carries the get_refund intent
    let result = system
        .execute(
            "find_common_questions",
            json!({"filter": {"category": "ORDER", "intent": "get_refund"}}),
        )
        .await;

    assert_eq!(result["patterns"], json!([]));
    assert_eq!(result["total_entries"], json!(0));
}

#[tokio::test]
async fn test_calculator_expression_grammar() {
    let system = sample_system();

    let result = system
        .execute("calculator", json!({"expression": "2 ** 3 + 1"}))
        .await;
    assert_eq!(result["result"], json!(9.0));

    // exponentiation binds tighter than unary minus
    let result = system
        .execute("calculator", json!({"expression": "-2^2"}))
        .await;
    assert_eq!(result["result"], json!(-4.0));
}

#[tokio::test]
async fn test_calculator_reports_bad_expressions_in_the_result() {
    let system = sample_system();

    let result = system
        .execute("calculator", json!({"expression": "2 +"}))
        .await;

    assert_eq!(result["error"], json!("Expression ended unexpectedly"));
    assert_eq!(result["expression"], json!("2 +"));
}
