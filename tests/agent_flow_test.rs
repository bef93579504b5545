//! Integration tests driving the full agent loop with MockLLMClient
//!
//! Every scenario goes through `Agent::ask`, the same entry point the CLI
//! uses, with scripted model responses instead of a live backend: scope
//! gating, tool round trips, plan execution, multi-turn history, and the
//! error paths a flaky backend or a confused model can trigger.

use bitext_agent::agent::{Agent, AgentError, AgentMode, OUT_OF_SCOPE_REPLY};
use bitext_agent::dataset::{DatasetStore, SupportRecord};
use bitext_agent::embedding::MockEmbedder;
use bitext_agent::llm::{BackendError, MessageKind, MockLLMClient, MockResponse};
use bitext_agent::progress::NoOpProgressHandler;
use std::sync::Arc;

/// A small slice of support conversations across two categories
fn sample_records() -> Vec<SupportRecord> {
    vec![
        SupportRecord {
            instruction: "I want to cancel order {{Order Number}}".to_string(),
            response: "I understand you need to cancel your order".to_string(),
            category: "ORDER".to_string(),
            intent: "cancel_order".to_string(),
            flags: "B".to_string(),
        },
        SupportRecord {
            instruction: "where is my package".to_string(),
            response: "Let me track that shipment for you".to_string(),
            category: "ORDER".to_string(),
            intent: "track_order".to_string(),
            flags: "BL".to_string(),
        },
        SupportRecord {
            instruction: "I want my money back".to_string(),
            response: "I can start the refund process right away".to_string(),
            category: "REFUND".to_string(),
            intent: "get_refund".to_string(),
            flags: "BQ".to_string(),
        },
    ]
}

/// Builds an agent over the sample records with a scripted LLM
fn agent_with(llm: Arc<MockLLMClient>, mode: AgentMode, max_iterations: usize) -> Agent {
    let store = Arc::new(DatasetStore::from_records(sample_records()));
    Agent::new(
        llm,
        store,
        Arc::new(MockEmbedder::new(8)),
        mode,
        max_iterations,
        Arc::new(NoOpProgressHandler),
    )
}

fn scope_in() -> MockResponse {
    MockResponse::text(r#"{"verdict": "in_scope", "reasoning": "Asks about the dataset"}"#)
}

fn scope_out() -> MockResponse {
    MockResponse::text(r#"{"verdict": "out_of_scope", "reasoning": "Unrelated to the dataset"}"#)
}

#[tokio::test]
async fn test_reactive_question_with_tool_round_trip() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_in(),
        MockResponse::text(
            r#"{"reasoning": "Cancellations live in the instruction column", "use_tool": true, "next_step": "Search for cancel"}"#,
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::exact_search_call("call_1", "cancel", None)],
        ),
        MockResponse::text(
            r#"{"reasoning": "The single match answers the question", "use_tool": false, "next_step": "Summarize it"}"#,
        ),
        MockResponse::text(
            r#"{"content": "One customer asked to cancel an order.", "reasoning": "exact_search returned a single row"}"#,
        ),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);
    let (answer, history) = agent
        .ask("Who asked about cancelling an order?", None)
        .await
        .unwrap();

    assert_eq!(answer.content, "One customer asked to cancel an order.");
    assert_eq!(answer.reasoning, "exact_search returned a single row");
    assert_eq!(llm.remaining_responses(), 0);

    // system, user, scope thinking, step thinking, tool call, tool result,
    // step thinking, final answer
    let kinds: Vec<MessageKind> = history.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MessageKind::System,
            MessageKind::UserFacing,
            MessageKind::Thinking,
            MessageKind::Thinking,
            MessageKind::ToolCall,
            MessageKind::ToolResult,
            MessageKind::Thinking,
            MessageKind::UserFacing,
        ]
    );

    let tool_result = &history[5];
    assert!(tool_result.content.contains("cancel order"));
    assert_eq!(history.last().unwrap().content, answer.content);
}

#[tokio::test]
async fn test_out_of_scope_skips_the_tool_loop() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_out(),
        // Decoy: the loop must never get this far
        MockResponse::text(r#"{"reasoning": "x", "use_tool": false, "next_step": "x"}"#),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);
    let (answer, history) = agent
        .ask("What is the weather in Lisbon?", None)
        .await
        .unwrap();

    assert_eq!(answer.content, OUT_OF_SCOPE_REPLY);
    assert_eq!(answer.reasoning, "Unrelated to the dataset");
    assert_eq!(llm.remaining_responses(), 1);

    let last = history.last().unwrap();
    assert_eq!(last.kind, MessageKind::UserFacing);
    assert_eq!(last.content, OUT_OF_SCOPE_REPLY);
}

#[tokio::test]
async fn test_plan_mode_runs_tool_steps_in_order() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_in(),
        MockResponse::text(
            r#"{
                "goal": "Report the share of refund questions",
                "steps": [
                    {"reasoning": "Counts per category give the raw numbers", "action": "Use the aggregator tool grouped by category", "expected_result": "A count per category", "depends_on": []},
                    {"reasoning": "The share needs arithmetic", "action": "Use the calculator tool on the counts", "expected_result": "A percentage", "depends_on": [0]}
                ]
            }"#,
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::aggregator_call(
                "call_1",
                "category",
                vec!["count"],
            )],
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::calculator_call("call_2", "1/3*100")],
        ),
        MockResponse::text(
            r#"{"content": "Refunds are about a third of the questions.", "reasoning": "One of three rows is a refund"}"#,
        ),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Plan, 10);
    let (answer, history) = agent
        .ask("What share of questions are about refunds?", None)
        .await
        .unwrap();

    assert_eq!(answer.content, "Refunds are about a third of the questions.");
    assert_eq!(llm.remaining_responses(), 0);

    // The rendered plan lands in the transcript before any step runs
    let plan_msg = &history[3];
    assert_eq!(plan_msg.kind, MessageKind::Thinking);
    assert!(plan_msg.content.contains("Steps:"));
    assert!(plan_msg
        .content
        .contains("Use the aggregator tool grouped by category"));
    assert!(plan_msg.content.contains("Use the calculator tool on the counts"));

    // Tool results arrive in plan order: the aggregate first, then the math
    let tool_results: Vec<&str> = history
        .iter()
        .filter(|m| m.kind == MessageKind::ToolResult)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(tool_results.len(), 2);
    assert!(tool_results[0].contains("total_rows"));
    assert!(tool_results[1].contains("\"result\""));
}

#[tokio::test]
async fn test_conversation_recovers_after_rejected_question() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_out(),
        scope_in(),
        MockResponse::text(
            r#"{"reasoning": "The overview lists the categories", "use_tool": false, "next_step": "Answer from the overview"}"#,
        ),
        MockResponse::text(
            r#"{"content": "ORDER and REFUND.", "reasoning": "Two categories in the data"}"#,
        ),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);

    let (first, history) = agent.ask("Tell me about Elon Musk", None).await.unwrap();
    assert_eq!(first.content, OUT_OF_SCOPE_REPLY);

    let (second, history) = agent
        .ask("What categories exist?", Some(history))
        .await
        .unwrap();
    assert_eq!(second.content, "ORDER and REFUND.");

    // One system prompt and both turns survive in a single transcript
    let system_count = history
        .iter()
        .filter(|m| m.kind == MessageKind::System)
        .count();
    assert_eq!(system_count, 1);
    assert!(history.iter().any(|m| m.content == OUT_OF_SCOPE_REPLY));
    assert!(history.iter().any(|m| m.content == "What categories exist?"));
}

#[tokio::test]
async fn test_iteration_limit_surfaces_from_ask() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_in(),
        MockResponse::text(
            r#"{"reasoning": "still digging", "use_tool": true, "next_step": "Search again"}"#,
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::exact_search_call("call_1", "order", None)],
        ),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 1);
    let result = agent.ask("Keep searching forever", None).await;

    match result.unwrap_err() {
        AgentError::IterationLimit { limit } => assert_eq!(limit, 1),
        _ => panic!("Expected IterationLimit error"),
    }
}

#[tokio::test]
async fn test_backend_failure_mid_loop_is_a_backend_error() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_in(),
        MockResponse::error(BackendError::NetworkError {
            message: "connection refused".to_string(),
        }),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);
    let result = agent.ask("How many entries are there?", None).await;

    match result.unwrap_err() {
        AgentError::Backend(BackendError::NetworkError { message }) => {
            assert_eq!(message, "connection refused");
        }
        _ => panic!("Expected Backend error"),
    }
}

#[tokio::test]
async fn test_malformed_scope_verdict_is_a_scope_error() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_response(MockResponse::text("sure, sounds on topic to me"));

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);
    let result = agent.ask("What categories exist?", None).await;

    match result.unwrap_err() {
        AgentError::Scope(_) => {}
        _ => panic!("Expected Scope error"),
    }
}

#[tokio::test]
async fn test_tool_failure_becomes_data_not_an_error() {
    let llm = Arc::new(MockLLMClient::new());
    llm.add_responses(vec![
        scope_in(),
        MockResponse::text(
            r#"{"reasoning": "A quick calculation settles it", "use_tool": true, "next_step": "Compute the ratio"}"#,
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::calculator_call("call_1", "foo(3)")],
        ),
        MockResponse::text(
            r#"{"reasoning": "The expression was invalid, answer without it", "use_tool": false, "next_step": "Explain the counts directly"}"#,
        ),
        MockResponse::text(
            r#"{"content": "There are 3 entries.", "reasoning": "Counted from the overview"}"#,
        ),
    ]);

    let agent = agent_with(Arc::clone(&llm), AgentMode::Reactive, 10);
    let (answer, history) = agent.ask("How many entries are there?", None).await.unwrap();

    // The failed evaluation rides back to the model as a result payload
    let tool_result = history
        .iter()
        .find(|m| m.kind == MessageKind::ToolResult)
        .unwrap();
    assert!(tool_result.content.contains("\"error\""));
    assert!(tool_result.content.contains("Unknown function or constant"));

    assert_eq!(answer.content, "There are 3 entries.");
}
