//! reel CLI
//!
//! Movie-industry question answering over a local knowledge store and the
//! web, with every answer scored for how well its sources support it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, KnowledgeCommand};
use reel_core::{config::AppConfig, failure_message, logging, AppError, AppResult, LogFormat};
use std::path::PathBuf;
use std::process::ExitCode;

/// reel - movie industry answers you can check
#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(about = "Movie industry question answering with source validation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "REEL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "REEL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Show underlying causes in error messages
    #[arg(long, global = true)]
    debug: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "REEL_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "REEL_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Interactive conversation
    Chat(ChatCommand),

    /// Knowledge store management
    Knowledge(KnowledgeCommand),
}

impl Cli {
    fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Knowledge(_) => "knowledge",
        }
    }

    fn load_config(&self) -> AppResult<AppConfig> {
        let mut config = AppConfig::load()?.with_overrides(
            self.workspace.clone(),
            self.config.clone(),
            self.provider.clone(),
            self.model.clone(),
            self.log_level.clone(),
            self.verbose,
            self.no_color,
            self.debug,
        );

        if let Some(ref format) = self.log_format {
            config.log_format = LogFormat::parse(format)
                .ok_or_else(|| AppError::Config(format!("Unknown log format: {}", format)))?;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("reel starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_reel_dir()?;

    let _span = tracing::info_span!("command", name = cli.command_name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Knowledge(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

/// Text printed when `command` fails.
///
/// Question commands hide the cause unless debugging.
fn error_text(command: &str, err: &AppError, debug: bool) -> String {
    match command {
        "ask" | "chat" => failure_message(err, debug),
        _ => format!("Error: {}", err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let debug = config.debug;
    let command = cli.command_name();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_text(command, &e, debug));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_per_command() {
        let err = AppError::Config("Unknown category 'casting'".to_string());

        let text = error_text("knowledge", &err, false);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("Unknown category 'casting'"));
        assert!(!text.contains("answering your question"));

        let text = error_text("ask", &err, false);
        assert!(text.contains("answering your question"));
        assert!(!text.contains("casting"));
        assert!(error_text("chat", &err, true).contains("casting"));
    }
}
