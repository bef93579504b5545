//! Command handlers for the bitext-agent binary
//!
//! Each handler returns a process exit code. The fallible work lives in a
//! `run_*` function returning `anyhow::Result`, so failures carry their full
//! context chain into the log line.

use crate::agent::Agent;
use crate::cli::commands::{AskArgs, ChatArgs, ConfigArgs, HealthArgs, ToolsArgs};
use crate::cli::output::{HealthStatus, OutputFormatter};
use crate::config::AgentConfig;
use crate::dataset::DatasetStore;
use crate::embedding::{Embedder, HttpEmbedder};
use crate::llm::{ChatMessage, GenAIClient, LLMClient, LLMRequest};
use crate::progress::{ConsoleProgressHandler, NoOpProgressHandler, ProgressHandler};
use crate::tools::ToolSystem;

use anyhow::{Context, Result};
use genai::adapter::AdapterKind;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

pub async fn handle_ask(args: &AskArgs, quiet: bool) -> i32 {
    info!("Answering a single question");

    match run_ask(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("ask failed: {:#}", e);
            1
        }
    }
}

async fn run_ask(args: &AskArgs, quiet: bool) -> Result<()> {
    let defaults = AgentConfig::from_env();
    let config = AgentConfig {
        provider: args.backend.unwrap_or(defaults.provider),
        model: args.model.clone().unwrap_or(defaults.model),
        mode: args.mode.unwrap_or(defaults.mode),
        ..defaults
    };
    if args.backend.is_some() {
        debug!("Provider explicitly set to: {:?}", config.provider);
    }
    if args.model.is_some() {
        debug!("Model overridden to: {}", config.model);
    }

    let progress: Arc<dyn ProgressHandler> = if quiet || args.quiet_thinking {
        Arc::new(NoOpProgressHandler)
    } else {
        Arc::new(ConsoleProgressHandler)
    };

    let agent = build_agent(&config, progress).await?;

    let (answer, _history) = agent.ask(&args.question, None).await?;

    let formatter = OutputFormatter::new(args.format.into());
    let output = formatter.format_answer(&answer, args.show_reasoning)?;

    println!("{}", output);

    Ok(())
}

pub async fn handle_chat(args: &ChatArgs, quiet: bool) -> i32 {
    info!("Starting interactive chat");

    match run_chat(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("chat failed: {:#}", e);
            1
        }
    }
}

async fn run_chat(args: &ChatArgs, quiet: bool) -> Result<()> {
    let defaults = AgentConfig::from_env();
    let config = AgentConfig {
        provider: args.backend.unwrap_or(defaults.provider),
        model: args.model.clone().unwrap_or(defaults.model),
        mode: args.mode.unwrap_or(defaults.mode),
        ..defaults
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    debug!("Chat session {} starting", session_id);

    // The REPL shows a spinner per question instead of the step trace.
    let agent = build_agent(&config, Arc::new(NoOpProgressHandler)).await?;

    let interactive = atty::is(atty::Stream::Stdin);
    if interactive && !quiet {
        println!(
            "bitext-agent v{} | {} ({}) | {} mode",
            crate::VERSION,
            config.provider.as_str(),
            config.model,
            config.mode
        );
        println!(
            "Session started {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("Ask about the Bitext customer support dataset. Type 'exit' or 'quit' to leave.");
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Option<Vec<ChatMessage>> = None;

    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let spinner = if interactive && !quiet {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message("thinking...");
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let result = agent.ask(question, history.clone()).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok((answer, new_history)) => {
                history = Some(new_history);
                println!("{}", answer.content);
                if interactive {
                    println!();
                }
            }
            // Keep the session alive; the previous turns remain usable.
            Err(e) => {
                error!("Failed to answer: {}", e);
            }
        }
    }

    debug!("Chat session {} ended", session_id);

    Ok(())
}

pub async fn handle_tools(args: &ToolsArgs) -> i32 {
    info!("Listing registered tools");

    match run_tools(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("tools listing failed: {:#}", e);
            1
        }
    }
}

fn run_tools(args: &ToolsArgs) -> Result<()> {
    let config = AgentConfig::from_env();

    // Listing needs the registry but no data behind it.
    let store = Arc::new(DatasetStore::from_records(Vec::new()));
    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(
        config.embeddings_url.clone(),
        config.embeddings_model.clone(),
        config.embeddings_dimensions,
    ));
    let system = ToolSystem::new(store, embedder);

    let formatter = OutputFormatter::new(args.format.into());
    let output = formatter.format_tools(&system.documentation(), &system.as_tool_definitions())?;

    println!("{}", output);

    Ok(())
}

pub async fn handle_config(args: &ConfigArgs) -> i32 {
    info!("Showing effective configuration");

    match run_config(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("config display failed: {:#}", e);
            1
        }
    }
}

fn run_config(args: &ConfigArgs) -> Result<()> {
    let config = AgentConfig::from_env();

    if let Err(e) = config.validate() {
        warn!("Current configuration is invalid: {}", e);
    }

    let formatter = OutputFormatter::new(args.format.into());
    let output = formatter.format_config(&config)?;

    println!("{}", output);

    Ok(())
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    info!("Checking agent health");

    let config = AgentConfig::from_env();
    let mut health_results = HashMap::new();

    let config_status = match config.validate() {
        Ok(()) => HealthStatus::available("All settings valid".to_string()).with_details(format!(
            "provider={}, model={}, mode={}",
            config.provider.as_str(),
            config.model,
            config.mode
        )),
        Err(e) => {
            warn!("Configuration invalid: {}", e);
            HealthStatus::unavailable(e.to_string())
                .with_details("Check BITEXT_AGENT_* environment variables".to_string())
        }
    };
    health_results.insert("Configuration".to_string(), config_status);

    debug!("Checking dataset at {}", config.dataset_path.display());
    let dataset_status = match DatasetStore::load(&config.dataset_path) {
        Ok(store) => {
            info!("Dataset loaded: {} records", store.len());
            HealthStatus::available(format!("Loaded {}", config.dataset_path.display()))
                .with_details(format!(
                    "{} records, {} categories, {} intents",
                    store.len(),
                    store.categories().len(),
                    store.intents().len()
                ))
        }
        Err(e) => {
            warn!("Dataset not usable: {}", e);
            HealthStatus::unavailable(e.to_string())
                .with_details("Set BITEXT_AGENT_DATASET to the dataset JSON file".to_string())
        }
    };
    health_results.insert("Dataset".to_string(), dataset_status);

    debug!("Pinging chat backend {}", config.provider.as_str());
    let backend_status = match GenAIClient::new(
        config.provider,
        config.model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .await
    {
        Ok(client) => {
            let ping = LLMRequest::new(vec![ChatMessage::user("ping")]).with_max_tokens(8);
            match client.chat(ping).await {
                Ok(response) => {
                    info!(
                        "{} responded in {:?}",
                        config.provider.as_str(),
                        response.response_time
                    );
                    HealthStatus::available(format!(
                        "{} reachable with model {}",
                        config.provider.as_str(),
                        config.model
                    ))
                    .with_details(format!("Responded in {:?}", response.response_time))
                }
                Err(e) => {
                    warn!("Chat backend unreachable: {}", e);
                    HealthStatus::unavailable(e.to_string())
                        .with_details(backend_help_hint(config.provider))
                }
            }
        }
        Err(e) => {
            warn!("Chat backend failed to initialize: {}", e);
            HealthStatus::unavailable(e.to_string())
                .with_details(backend_help_hint(config.provider))
        }
    };
    let backend_available = backend_status.available;
    health_results.insert("Chat Backend".to_string(), backend_status);

    debug!("Checking embeddings service at {}", config.embeddings_url);
    let embedder = HttpEmbedder::new(
        config.embeddings_url.clone(),
        config.embeddings_model.clone(),
        config.embeddings_dimensions,
    );
    let embeddings_status = match embedder.health_check().await {
        Ok(true) => {
            info!("Embeddings service reachable at {}", config.embeddings_url);
            HealthStatus::available(format!("Service reachable at {}", config.embeddings_url))
                .with_details(format!(
                    "model={}, dimensions={}",
                    config.embeddings_model, config.embeddings_dimensions
                ))
        }
        Ok(false) => {
            warn!("Embeddings service unhealthy at {}", config.embeddings_url);
            HealthStatus::unavailable(format!(
                "No healthy response from {}",
                config.embeddings_url
            ))
            .with_details("Semantic search and clustering tools will fail".to_string())
        }
        Err(e) => {
            warn!("Embeddings health check failed: {}", e);
            HealthStatus::unavailable(e.to_string())
                .with_details("Semantic search and clustering tools will fail".to_string())
        }
    };
    health_results.insert("Embeddings".to_string(), embeddings_status);

    let formatter = OutputFormatter::new(args.format.into());
    let output = match formatter.format_health(&health_results) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format health output: {}", e);
            return 1;
        }
    };

    println!("{}", output);

    // The agent cannot do anything without its chat backend; the other
    // components only degrade specific commands or tools.
    if backend_available {
        0
    } else {
        1
    }
}

/// Builds the full agent stack from a validated configuration.
async fn build_agent(config: &AgentConfig, progress: Arc<dyn ProgressHandler>) -> Result<Agent> {
    config
        .validate()
        .context("configuration error (check BITEXT_AGENT_* environment variables and flags)")?;

    let store = DatasetStore::load(&config.dataset_path).with_context(|| {
        format!(
            "failed to load dataset from {}",
            config.dataset_path.display()
        )
    })?;
    info!(
        "Dataset loaded: {} records, {} categories",
        store.len(),
        store.categories().len()
    );
    let store = Arc::new(store);

    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::with_timeout(
        config.embeddings_url.clone(),
        config.embeddings_model.clone(),
        config.embeddings_dimensions,
        Duration::from_secs(config.request_timeout_secs),
    ));

    let llm: Arc<dyn LLMClient> = match GenAIClient::new(
        config.provider,
        config.model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .await
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            print_backend_help(config.provider);
            return Err(e).context("failed to initialize chat backend");
        }
    };

    info!(
        "Using backend: {} ({})",
        llm.name(),
        llm.model_info().unwrap_or_else(|| "default".to_string())
    );

    let tools = Arc::new(ToolSystem::with_cache_enabled(
        Arc::clone(&store),
        embedder,
        config.cache_enabled,
    ));

    Ok(Agent::from_parts(
        llm,
        tools,
        store,
        config.mode,
        config.max_iterations,
        progress,
    ))
}

fn print_backend_help(provider: AdapterKind) {
    eprintln!("\nPossible solutions:");
    match provider {
        AdapterKind::Ollama => {
            eprintln!("  - Ensure Ollama is running: ollama serve");
            eprintln!(
                "  - Check OLLAMA_HOST environment variable (default: http://localhost:11434)"
            );
            eprintln!("  - Try a different provider: --backend openai, --backend anthropic, etc.");
        }
        AdapterKind::OpenAI => {
            eprintln!("  - Set OPENAI_API_KEY environment variable");
            eprintln!("  - Optionally set BITEXT_AGENT_API_BASE_URL for custom endpoints");
        }
        AdapterKind::Anthropic => {
            eprintln!("  - Set ANTHROPIC_API_KEY environment variable");
        }
        AdapterKind::Gemini => {
            eprintln!("  - Set GOOGLE_API_KEY environment variable");
        }
        AdapterKind::Xai => {
            eprintln!("  - Set XAI_API_KEY environment variable");
        }
        AdapterKind::Groq => {
            eprintln!("  - Set GROQ_API_KEY environment variable");
        }
        _ => {
            eprintln!("  - Check provider-specific environment variables");
            eprintln!("  - Refer to provider documentation for setup instructions");
        }
    }
    eprintln!("  - Run 'bitext-agent health' to check backend availability");
}

fn backend_help_hint(provider: AdapterKind) -> String {
    let hint = match provider {
        AdapterKind::Ollama => "Ensure Ollama is running: ollama serve",
        AdapterKind::OpenAI => "Set OPENAI_API_KEY environment variable",
        AdapterKind::Anthropic => "Set ANTHROPIC_API_KEY environment variable",
        AdapterKind::Gemini => "Set GOOGLE_API_KEY environment variable",
        AdapterKind::Xai => "Set XAI_API_KEY environment variable",
        AdapterKind::Groq => "Set GROQ_API_KEY environment variable",
        _ => "Check provider-specific environment variables",
    };
    hint.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_help_hint_known_providers() {
        assert!(backend_help_hint(AdapterKind::OpenAI).contains("OPENAI_API_KEY"));
        assert!(backend_help_hint(AdapterKind::Ollama).contains("ollama serve"));
        assert!(backend_help_hint(AdapterKind::Anthropic).contains("ANTHROPIC_API_KEY"));
        assert!(backend_help_hint(AdapterKind::Groq).contains("GROQ_API_KEY"));
    }
}
