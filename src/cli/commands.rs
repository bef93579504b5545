use crate::agent::AgentMode;
use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;

/// Conversational agent over the Bitext customer support dataset
#[derive(Parser, Debug)]
#[command(
    name = "bitext-agent",
    about = "Conversational agent that answers questions about the Bitext customer support dataset",
    version,
    author,
    long_about = "bitext-agent answers natural-language questions about the Bitext customer \
                  support dataset through an LLM tool-calling loop. Questions outside the \
                  dataset domain are rejected by a scope check. It supports multiple AI \
                  backends (Ollama, OpenAI, Anthropic, Gemini, xAI, Groq) and output formats."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Ask a single question about the dataset",
        long_about = "Runs one question through the agent loop and prints the answer.\n\n\
                      Examples:\n  \
                      bitext-agent ask \"How many categories are in the dataset?\"\n  \
                      bitext-agent ask --mode plan \"Summarize the REFUND category\"\n  \
                      bitext-agent ask --format json --show-reasoning \"What is 15% of 200?\"\n  \
                      bitext-agent ask --backend ollama --model qwen2.5:7b \"List the intents\""
    )]
    Ask(AskArgs),

    #[command(
        about = "Start an interactive chat session",
        long_about = "Opens a REPL that keeps conversation history across turns. \
                      Type 'exit' or 'quit' to leave.\n\n\
                      Examples:\n  \
                      bitext-agent chat\n  \
                      bitext-agent chat --mode plan"
    )]
    Chat(ChatArgs),

    #[command(
        about = "List the registered tools",
        long_about = "Prints every tool the agent can call, with parameter documentation.\n\n\
                      Examples:\n  \
                      bitext-agent tools\n  \
                      bitext-agent tools --format json"
    )]
    Tools(ToolsArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Prints the configuration resolved from BITEXT_AGENT_* environment \
                      variables and defaults.\n\n\
                      Examples:\n  \
                      bitext-agent config\n  \
                      bitext-agent config --format yaml"
    )]
    Config(ConfigArgs),

    #[command(
        about = "Check agent component health",
        long_about = "Checks configuration validity, dataset availability, chat backend \
                      reachability, and the embeddings endpoint. Exits non-zero when the \
                      chat backend is unreachable.\n\n\
                      Examples:\n  \
                      bitext-agent health\n  \
                      bitext-agent health --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AskArgs {
    #[arg(value_name = "QUESTION", help = "The question to ask the agent")]
    pub question: String,

    #[arg(
        long,
        value_enum,
        help = "Agent loop strategy (defaults to BITEXT_AGENT_MODE or reactive)"
    )]
    pub mode: Option<AgentMode>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Include the agent's reasoning with the answer")]
    pub show_reasoning: bool,

    #[arg(long, help = "Suppress the thinking trace on stderr")]
    pub quiet_thinking: bool,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_adapter_kind,
        help = "Force a specific AI backend provider (defaults to BITEXT_AGENT_PROVIDER)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name to use (provider-specific, e.g., 'qwen2.5:7b' for Ollama)"
    )]
    pub model: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    #[arg(
        long,
        value_enum,
        help = "Agent loop strategy (defaults to BITEXT_AGENT_MODE or reactive)"
    )]
    pub mode: Option<AgentMode>,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_adapter_kind,
        help = "Force a specific AI backend provider (defaults to BITEXT_AGENT_PROVIDER)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name to use (provider-specific, e.g., 'qwen2.5:7b' for Ollama)"
    )]
    pub model: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ToolsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    AdapterKind::from_lower_str(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "Invalid provider: {}. Valid options: ollama, openai, anthropic, gemini, xai, groq",
            s
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        // Verify that CLI structure is valid
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_ask_args() {
        let args = CliArgs::parse_from(["bitext-agent", "ask", "how many rows?"]);
        match args.command {
            Commands::Ask(ask_args) => {
                assert_eq!(ask_args.question, "how many rows?");
                assert_eq!(ask_args.format, OutputFormatArg::Human);
                assert!(ask_args.mode.is_none());
                assert!(!ask_args.show_reasoning);
                assert!(!ask_args.quiet_thinking);
                assert!(ask_args.backend.is_none());
                assert!(ask_args.model.is_none());
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_ask_with_options() {
        let args = CliArgs::parse_from([
            "bitext-agent",
            "ask",
            "--mode",
            "plan",
            "--format",
            "json",
            "--show-reasoning",
            "--quiet-thinking",
            "--backend",
            "ollama",
            "--model",
            "qwen2.5:7b",
            "summarize refunds",
        ]);

        match args.command {
            Commands::Ask(ask_args) => {
                assert_eq!(ask_args.question, "summarize refunds");
                assert_eq!(ask_args.mode, Some(AgentMode::Plan));
                assert_eq!(ask_args.format, OutputFormatArg::Json);
                assert!(ask_args.show_reasoning);
                assert!(ask_args.quiet_thinking);
                assert_eq!(ask_args.backend, Some(AdapterKind::Ollama));
                assert_eq!(ask_args.model, Some("qwen2.5:7b".to_string()));
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        let result = CliArgs::try_parse_from(["bitext-agent", "ask"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_command() {
        let args = CliArgs::parse_from(["bitext-agent", "chat"]);
        match args.command {
            Commands::Chat(chat_args) => {
                assert!(chat_args.mode.is_none());
                assert!(chat_args.backend.is_none());
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_chat_with_mode() {
        let args = CliArgs::parse_from(["bitext-agent", "chat", "--mode", "reactive"]);
        match args.command {
            Commands::Chat(chat_args) => {
                assert_eq!(chat_args.mode, Some(AgentMode::Reactive));
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_tools_command() {
        let args = CliArgs::parse_from(["bitext-agent", "tools", "--format", "yaml"]);
        match args.command {
            Commands::Tools(tools_args) => {
                assert_eq!(tools_args.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Tools command"),
        }
    }

    #[test]
    fn test_config_command() {
        let args = CliArgs::parse_from(["bitext-agent", "config"]);
        match args.command {
            Commands::Config(config_args) => {
                assert_eq!(config_args.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_health_command() {
        let args = CliArgs::parse_from(["bitext-agent", "health", "--format", "json"]);
        match args.command {
            Commands::Health(health_args) => {
                assert_eq!(health_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Health command"),
        }
    }

    #[test]
    fn test_global_verbose_flag() {
        let args = CliArgs::parse_from(["bitext-agent", "-v", "tools"]);
        assert!(args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_global_quiet_flag() {
        let args = CliArgs::parse_from(["bitext-agent", "-q", "tools"]);
        assert!(!args.verbose);
        assert!(args.quiet);
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["bitext-agent", "--log-level", "debug", "tools"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_adapter_kind_parsing() {
        assert!(parse_adapter_kind("ollama").is_ok());
        assert!(parse_adapter_kind("openai").is_ok());
        assert!(parse_adapter_kind("anthropic").is_ok());
        assert!(parse_adapter_kind("gemini").is_ok());
        assert!(parse_adapter_kind("xai").is_ok());
        assert!(parse_adapter_kind("groq").is_ok());
        assert!(parse_adapter_kind("invalid").is_err());
    }
}
