//! # docchat CLI
//!
//! The `docchat` binary answers questions about a single document, either
//! one-shot from the command line or as a Telegram bot.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! docchat --document ./documento.pdf <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat context "<q>"` | Print the retrieval context for a question |
//! | `docchat ask "<q>"` | Answer a question with the hosted model |
//! | `docchat stats` | Build the index and print a summary |
//! | `docchat serve telegram` | Run the Telegram bot |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docchat::config;

/// docchat — answer questions about a document with local retrieval and a
/// hosted language model.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "docchat — answer questions about a document with local retrieval and a hosted language model",
    version,
    long_about = "docchat extracts the text of one document, splits it into overlapping chunks, \
    ranks them against each question by word overlap (no embeddings), and sends the best chunks \
    with the question to an OpenAI-compatible chat model. It runs one-shot or as a Telegram bot."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docchat.toml`. Ignored when the file does not
    /// exist and `--document` is given.
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    /// Document to answer from. Overrides `[document].path`.
    #[arg(long, global = true)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the retrieval context for a question.
    ///
    /// Builds the index and prints the top-ranked chunks joined by blank
    /// lines, exactly as they would be sent to the model.
    Context {
        /// The question.
        question: String,

        /// Number of chunks to select (defaults to `[retrieval].top_k`).
        #[arg(long)]
        k: Option<usize>,

        /// Show chunk positions and overlap scores instead of raw context.
        #[arg(long)]
        explain: bool,
    },

    /// Answer a question using the hosted model.
    ///
    /// Requires the API key environment variable named by
    /// `[llm].api_key_env` (default `GROQ_API_KEY`).
    Ask {
        /// The question.
        question: String,

        /// Number of chunks to select (defaults to `[retrieval].top_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Build the index and print chunk and vocabulary statistics.
    Stats,

    /// Run a chat front-end.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Front-end subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Run the Telegram bot (long polling).
    ///
    /// Requires `TELEGRAM_BOT_TOKEN` (or the variable named by
    /// `[telegram].token_env`) and the model API key.
    Telegram,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file, or fall back to defaults when only `--document`
/// was supplied.
///
/// `load_config` validates the file; the defaults are always valid and the
/// document path takes no part in validation.
fn resolve_config(cli: &Cli) -> anyhow::Result<config::Config> {
    let mut cfg = match (&cli.document, cli.config.exists()) {
        (Some(doc), false) => config::Config::minimal(doc),
        _ => config::load_config(&cli.config)?,
    };
    if let Some(doc) = &cli.document {
        cfg.document.path = doc.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = resolve_config(&cli)?;

    match cli.command {
        Commands::Context {
            question,
            k,
            explain,
        } => {
            docchat::answer::run_context(&cfg, &question, k, explain).await?;
        }
        Commands::Ask { question, k } => {
            docchat::answer::run_ask(&cfg, &question, k).await?;
        }
        Commands::Stats => {
            docchat::stats::run_stats(&cfg).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Telegram => {
                docchat::telegram::run_telegram(&cfg).await?;
            }
        },
    }

    Ok(())
}
