use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    CommunityAction, ConfigAction, InferenceAction, ModelAction, PresetAction,
};

#[derive(Parser)]
#[command(name = "llm-manager", version)]
#[command(about = "Manage presets and models of a local LLM backend and chat with them", long_about = None)]
struct Cli {
    /// Backend base URL, overrides the saved setting for this run
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Community catalog base URL, overrides the saved setting for this run
    #[arg(long, global = true)]
    community_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a preset and chat with it
    Chat {
        preset_id: i64,
    },
    /// Manage presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Manage models
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Inspect or control the inference runtime
    Inference {
        #[command(subcommand)]
        action: InferenceAction,
    },
    /// Browse, import and publish community presets
    Community {
        #[command(subcommand)]
        action: CommunityAction,
    },
    /// Show or persist console settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_tracing() {
    // Logs go to stderr and stay quiet by default so they do not break up
    // streamed replies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context::load(cli.base_url, cli.community_url)?;

    match cli.command {
        Commands::Chat { preset_id } => commands::chat::run(&ctx, preset_id).await?,
        Commands::Presets { action } => commands::presets::run(&ctx, action).await?,
        Commands::Models { action } => commands::models::run(&ctx, action).await?,
        Commands::Inference { action } => commands::inference::run(&ctx, action).await?,
        Commands::Community { action } => commands::community::run(&ctx, action).await?,
        Commands::Config { action } => commands::config::run(&ctx, action)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let result = runtime.block_on(run(cli));
    // A pending stdin read must not hold up exit
    runtime.shutdown_background();
    result
}
