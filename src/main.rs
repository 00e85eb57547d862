//! Scribe CLI
//!
//! Runs the MCP server over stdio, the HTTP API, or a connectivity check.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_core::api::{self, AppState};
use scribe_core::mcp::{McpServer, ToolHandler};
use scribe_core::types::TermQuery;
use scribe_core::{Config, Operations, WordPressBackend, WordPressClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Generate and publish WordPress posts with an LLM", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Optional TOML configuration file, read before the environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server (stdio mode)
    Serve,

    /// Start the HTTP API (includes MCP at POST /mcp)
    Http {
        /// Listen host (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Verify WordPress credentials and report AI availability
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    debug!("Scribe v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve => {
            let ops = Arc::new(Operations::from_config(&config)?);
            info!(ai = ops.ai_available(), "Starting MCP server");
            let server = McpServer::new(ToolHandler::new(ops));
            server.run().await?;
        }
        Commands::Http { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let ops = Arc::new(Operations::from_config(&config)?);
            info!(ai = ops.ai_available(), "Starting HTTP API");
            let state = AppState::new(ops, config.wordpress.base_url.as_str());
            api::serve(&config.server, state).await?;
        }
        Commands::Check => check(&config).await?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays a clean MCP channel
fn init_tracing(log_level: &str) {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "scribe={level},scribe_core={level},tower_http={level},hyper=warn,reqwest=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn check(config: &Config) -> Result<()> {
    let client = WordPressClient::new(&config.wordpress)?;
    let categories = client
        .list_categories(&TermQuery::default())
        .await
        .context("WordPress check failed")?;

    println!("WordPress: OK ({})", config.wordpress.base_url);
    println!("  categories visible: {}", categories.len());
    match &config.llm {
        Some(llm) => println!("AI: configured (model {})", llm.model),
        None => println!("AI: disabled (set ANTHROPIC_API_KEY to enable)"),
    }
    Ok(())
}
