//! LifeCapsule CLI
//!
//! Runs the diary HTTP server, the interactive chat loop, and one-shot
//! diary commands against the local workspace.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{
    AnalyzeCommand, ChatCommand, PromptCommand, SaveCommand, ServeCommand, StatsCommand,
};
use lifecapsule_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// LifeCapsule - a personal diary you can talk to
#[derive(Parser, Debug)]
#[command(name = "lifecapsule")]
#[command(about = "A personal diary you can ask questions about", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "LIFECAPSULE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "LIFECAPSULE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider
    #[arg(short, long, global = true, env = "LIFECAPSULE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "LIFECAPSULE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the diary HTTP server
    Serve(ServeCommand),

    /// Chat with the model interactively
    Chat(ChatCommand),

    /// Save a diary entry
    Save(SaveCommand),

    /// Ask a question about the diary
    Analyze(AnalyzeCommand),

    /// Send a single prompt to the model
    Prompt(PromptCommand),

    /// Show diary and knowledge base statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Chat(_) => "chat",
            Commands::Save(_) => "save",
            Commands::Analyze(_) => "analyze",
            Commands::Prompt(_) => "prompt",
            Commands::Stats(_) => "stats",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(
            None,
            None,
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    config.validate().context("Invalid configuration")?;

    tracing::info!("LifeCapsule starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Save(cmd) => cmd.execute(&config).await,
        Commands::Analyze(cmd) => cmd.execute(&config).await,
        Commands::Prompt(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}
