pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AskArgs, ChatArgs, CliArgs, Commands, ConfigArgs, HealthArgs, ToolsArgs};
pub use output::{HealthStatus, OutputFormat, OutputFormatter};
