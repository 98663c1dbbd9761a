//! osqrun - run a single query against a local osquery extension socket.
//!
//! Connects to an already-running daemon over a Unix domain socket, issues
//! one SQL query, and prints the result rows to stdout.

mod client;
mod config;
mod protocol;
mod runner;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command as ProcessCommand;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "osqrun")]
#[command(author, version, about = "Run a single query against a local osquery extension socket")]
#[command(long_about = "Connects to a running osquery-compatible daemon over its extension \
socket, runs one query, and prints the rows.\n\nThe daemon must already be listening on the \
socket; osqrun never starts or manages it.")]
struct Cli {
    /// Path to the extension socket (default: /tmp/osquery.ext.sock)
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// SQL query to run (default: the query from the config file)
    #[arg(long, value_name = "SQL")]
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open configuration file in $EDITOR
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr so stdout stays clean for query output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("osqrun=warn".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => handle_config(),
        None => run_query(cli.socket, cli.query).await,
    }
}

/// Connect, run the query, and render the result to stdout.
///
/// A connection failure is fatal (non-zero exit). A query rejected by the
/// daemon is reported on stdout and the process still exits cleanly.
async fn run_query(socket: Option<PathBuf>, query: Option<String>) -> Result<()> {
    let config = config::Config::load()?;
    let socket = socket.unwrap_or(config.socket);
    let query = query.unwrap_or(config.query);

    let mut client = client::SocketClient::connect(&socket)
        .await
        .with_context(|| {
            format!(
                "No daemon reachable at {}. Is one running with an extension socket there?",
                socket.display()
            )
        })?;
    info!("Connected to {}", socket.display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner::run(&mut client, &query, &mut out).await
}

/// Handle the config command.
fn handle_config() -> Result<()> {
    let config_path = config::Config::config_path()?;

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Create default config if it doesn't exist
    if !config_path.exists() {
        let default_config = config::Config::default();
        default_config.save()?;
        println!("Created default config at {}", config_path.display());
    }

    // Open in editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = ProcessCommand::new(&editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}
