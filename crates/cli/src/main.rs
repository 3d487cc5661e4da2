//! ragdock CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP API server
//! - `ingest`: Add a local file to the document collection
//! - `remember`: Store a personal fact
//! - `ask`: One-shot grounded answer
//! - `stats`: Show collection counts
//! - `reset`: Clear both collections
//! - `config`: Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ragdock_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "ragdock",
    about = "ragdock: retrieval-augmented answers over your own documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.ragdock/config.toml)
    #[arg(short, long, global = true, env = "RAGDOCK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Extract, chunk, embed and store a local file
    Ingest {
        /// File to ingest (.pdf, .docx, .txt, .md, .html)
        path: PathBuf,

        /// Record this source instead of the file name
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Store a personal fact in memory
    Remember {
        /// The fact to remember
        fact: String,
    },

    /// Ask a one-shot question grounded in stored context
    Ask {
        /// The question
        question: String,

        /// Number of document passages to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<i64>,
    },

    /// Show collection counts and storage location
    Stats,

    /// Delete every document and memory
    Reset {
        /// Skip the safety check
        #[arg(long)]
        confirm: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    let config = AppConfig::load_with_env(&config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Ingest { path, source } => commands::ingest::run(config, path, source).await?,
        Commands::Remember { fact } => commands::remember::run(config, fact).await?,
        Commands::Ask { question, top_k } => commands::ask::run(config, question, top_k).await?,
        Commands::Stats => commands::stats::run(config).await?,
        Commands::Reset { confirm } => commands::reset::run(config, confirm).await?,
        Commands::Config => commands::config_cmd::show(&config, &config_path)?,
    }

    Ok(())
}
